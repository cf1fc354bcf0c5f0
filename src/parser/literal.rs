//! Decoding of integer, character and string literals.

use thiserror::Error;

use crate::core::Num;

/// A literal that is lexically well-formed but has no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("invalid integer literal `{0}`")]
    InvalidInteger(String),

    #[error("invalid character escape sequence `{0}`")]
    InvalidEscape(String),

    #[error("invalid character escape sequence `{0}`")]
    InvalidHexEscape(String),

    #[error("character literal `{0}` is empty")]
    EmptyChar(String),

    #[error("character literal `{0}` contains more than one character")]
    WideChar(String),
}

impl LiteralError {
    pub fn help(&self) -> Option<&'static str> {
        match self {
            LiteralError::InvalidHexEscape(_) => Some(
                "ascii escape sequences must be of the form `\\xHH`, where H are hexadecimal digits",
            ),
            _ => None,
        }
    }
}

/// Parse an integer literal: decimal, or `0b`/`0o`/`0d`/`0x` prefixed.
pub fn parse_integer(text: &str) -> Result<Num, LiteralError> {
    let invalid = || LiteralError::InvalidInteger(text.to_string());

    let (digits, radix) = match text.as_bytes() {
        [b'0', prefix, _, ..] => match prefix {
            b'b' => (&text[2..], 2),
            b'o' => (&text[2..], 8),
            b'd' => (&text[2..], 10),
            b'x' => (&text[2..], 16),
            _ => (text, 10),
        },
        _ => (text, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    Num::from_str_radix(digits, radix).map_err(|_| invalid())
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

/// Decode the body of a quoted literal into bytes.
pub fn decode_escapes(raw: &str) -> Result<Vec<u8>, LiteralError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        i += 1;
        if byte != b'\\' {
            out.push(byte);
            continue;
        }

        let Some(&escape) = bytes.get(i) else {
            return Err(LiteralError::InvalidEscape("\\".to_string()));
        };
        i += 1;
        let decoded = match escape {
            b'\\' => b'\\',
            b'\'' => b'\'',
            b'"' => b'"',
            b';' => b';',
            b'?' => b'?',
            b' ' | b's' => b' ',
            b'0' => 0,
            b'a' => 0x07,
            b'b' => 0x08,
            b'e' => 0x1b,
            b'f' => 0x0c,
            b'n' | b'\n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'v' => 0x0b,
            b'x' => {
                let digits = bytes
                    .get(i..i + 2)
                    .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit));
                match digits {
                    Some(pair) => {
                        i += 2;
                        (hex_value(pair[0]) << 4) | hex_value(pair[1])
                    }
                    None => {
                        let end = (i + 2).min(bytes.len());
                        let seen = String::from_utf8_lossy(&bytes[i..end]);
                        return Err(LiteralError::InvalidHexEscape(format!("\\x{}", seen)));
                    }
                }
            }
            other => {
                let seen = String::from_utf8_lossy(&[other]).into_owned();
                return Err(LiteralError::InvalidEscape(format!("\\{}", seen)));
            }
        };
        out.push(decoded);
    }
    Ok(out)
}

/// Decode a character literal body to its single byte value.
pub fn decode_char(raw: &str) -> Result<Num, LiteralError> {
    let quoted = || format!("'{}'", raw);
    match decode_escapes(raw)?.as_slice() {
        [] => Err(LiteralError::EmptyChar(quoted())),
        [byte] => Ok(Num::from(*byte)),
        _ => Err(LiteralError::WideChar(quoted())),
    }
}
