//! Tokenizer for Spherehorn source.
//!
//! A token is one of:
//! - a special character: `{ } ( ) ; ? ! . &`
//! - a string or character literal, kept raw (escapes are decoded later)
//! - any other run of characters up to whitespace, a special character, a
//!   quote or `#`; classified as integer, variable, boolean or keyword
//!
//! Comments run from `#` (outside literals) to the end of the line.

use std::fmt;

use crate::ast::Condition;
use crate::core::SourceLocation;

/// Tokens produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An instruction keyword, or `a:` / `c:` at top level.
    Keyword(String),
    /// `.`
    SetMemory,
    /// `a` (accumulator) or `m` (active cell).
    Variable(char),
    /// `;`, `?` or `!`.
    Terminator(Condition),
    /// `{`
    OpenBlock,
    /// `}`
    CloseBlock,
    /// `(`
    OpenMemory,
    /// `)`
    CloseMemory,
    /// Text between `"` quotes, escapes undecoded.
    Str { raw: String, closed: bool },
    /// Text between `'` quotes, escapes undecoded.
    Char { raw: String, closed: bool },
    /// A run starting with a digit.
    Integer(String),
    /// `T` or `F`.
    Bool(bool),
    /// `&`
    Concat,
    End,
}

impl Token {
    pub fn is_numeric_literal(&self) -> bool {
        matches!(self, Token::Char { .. } | Token::Integer(_) | Token::Bool(_))
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, Token::Variable(_)) || self.is_numeric_literal()
    }

    pub fn is_memory_literal(&self) -> bool {
        matches!(self, Token::Str { .. } | Token::OpenMemory) || self.is_numeric_literal()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(word) | Token::Integer(word) => write!(f, "{}", word),
            Token::SetMemory => write!(f, "."),
            Token::Variable(name) => write!(f, "{}", name),
            Token::Terminator(cond) => write!(f, "{}", cond.terminator()),
            Token::OpenBlock => write!(f, "{{"),
            Token::CloseBlock => write!(f, "}}"),
            Token::OpenMemory => write!(f, "("),
            Token::CloseMemory => write!(f, ")"),
            Token::Str { raw, closed } => {
                write!(f, "\"{}", raw)?;
                if *closed {
                    write!(f, "\"")?;
                }
                Ok(())
            }
            Token::Char { raw, closed } => {
                write!(f, "'{}", raw)?;
                if *closed {
                    write!(f, "'")?;
                }
                Ok(())
            }
            Token::Bool(true) => write!(f, "T"),
            Token::Bool(false) => write!(f, "F"),
            Token::Concat => write!(f, "&"),
            Token::End => write!(f, "end of input"),
        }
    }
}

/// A token with the position of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub location: SourceLocation,
}

impl SpannedToken {
    pub fn new(token: Token, location: SourceLocation) -> Self {
        Self { token, location }
    }
}

fn is_special(ch: char) -> bool {
    matches!(ch, '{' | '}' | '(' | ')' | ';' | '?' | '!' | '.' | '&')
}

fn ends_word(ch: char) -> bool {
    ch.is_whitespace() || is_special(ch) || matches!(ch, '#' | '"' | '\'')
}

fn classify(word: String) -> Token {
    match word.as_str() {
        "a" => Token::Variable('a'),
        "m" => Token::Variable('m'),
        "T" => Token::Bool(true),
        "F" => Token::Bool(false),
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => Token::Integer(word),
        _ => Token::Keyword(word),
    }
}

struct Cursor<'s> {
    chars: std::iter::Peekable<std::str::Chars<'s>>,
    line: usize,
    column: usize,
}

impl<'s> Cursor<'s> {
    fn new(input: &'s str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Read a quoted literal body; the opening quote is already consumed.
    fn quoted(&mut self, quote: char) -> (String, bool) {
        let mut raw = String::new();
        while let Some(ch) = self.bump() {
            if ch == quote {
                return (raw, true);
            }
            raw.push(ch);
            if ch == '\\' {
                if let Some(escaped) = self.bump() {
                    raw.push(escaped);
                }
            }
        }
        (raw, false)
    }
}

/// Tokenize source code, ending with a single [`Token::End`].
pub fn tokenize(input: &str) -> Vec<SpannedToken> {
    let mut cursor = Cursor::new(input);
    let mut tokens = Vec::new();

    loop {
        let location = cursor.location();
        let Some(ch) = cursor.bump() else {
            tokens.push(SpannedToken::new(Token::End, location));
            return tokens;
        };

        let token = match ch {
            c if c.is_whitespace() => continue,
            '#' => {
                while let Some(c) = cursor.peek() {
                    if c == '\n' {
                        break;
                    }
                    cursor.bump();
                }
                continue;
            }
            '{' => Token::OpenBlock,
            '}' => Token::CloseBlock,
            '(' => Token::OpenMemory,
            ')' => Token::CloseMemory,
            '.' => Token::SetMemory,
            '&' => Token::Concat,
            ';' => Token::Terminator(Condition::Always),
            '?' => Token::Terminator(Condition::WhenTrue),
            '!' => Token::Terminator(Condition::WhenFalse),
            '"' => {
                let (raw, closed) = cursor.quoted('"');
                Token::Str { raw, closed }
            }
            '\'' => {
                let (raw, closed) = cursor.quoted('\'');
                Token::Char { raw, closed }
            }
            first => {
                let mut word = String::from(first);
                while let Some(c) = cursor.peek() {
                    if ends_word(c) {
                        break;
                    }
                    word.push(c);
                    cursor.bump();
                }
                classify(word)
            }
        };
        tokens.push(SpannedToken::new(token, location));
    }
}
