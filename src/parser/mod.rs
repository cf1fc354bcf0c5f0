//! Lexer and parser for Spherehorn.
//!
//! Syntax:
//! - Instruction block: `{ [terminator] container* }`
//! - Instruction: `keyword [argument] [terminator]`, or `. argument` /
//!   `. memory-literal` to assign the active cell
//! - Terminators: `;` always, `?` when the condition register is set,
//!   `!` when it is clear
//! - Arguments: integers (`42`, `0b101`, `0o17`, `0d9`, `0xFF`), characters
//!   (`'x'`), booleans (`T`, `F`), `a` (accumulator), `m` (active cell)
//! - Memory literals: numeric literals, strings (`"ab" & "cd"`) and
//!   nested `( ... )` groups
//! - Top level: one instruction block, at most one memory literal, and
//!   optional `a: n` / `c: n` register seeds, in any order
//! - Comments: `#` to end of line
//!
//! # Architecture
//!
//! - `lexer`: spanned tokens, raw literal bodies
//! - `literal`: integer and escape decoding
//! - `keywords`: keyword to operation tables
//!
//! The parser never stops at the first problem. Every diagnostic is collected
//! and returned together; a source with any error yields no program.

pub mod keywords;
pub mod lexer;
pub mod literal;

use tracing::debug;

use crate::ast::{Argument, Block, Condition, Container, Instruction, Op};
use crate::core::{CellTree, Num, ParseError, ParseErrors, SourceLocation};

pub use lexer::{tokenize, SpannedToken, Token};
pub use literal::LiteralError;

/// Everything the front end extracts from one source file.
#[derive(Debug, Clone)]
pub struct ParsedProgram {
    pub root: Block,
    /// Initial memory literal, if one was given.
    pub memory: Option<CellTree>,
    /// Seed for the accumulator (`a:`).
    pub accumulator: Option<Num>,
    /// Seed for the condition register (`c:`).
    pub condition: Option<bool>,
}

/// Recursive-descent parser over a token vector.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let tokens = tokenize(source);
        debug!(tokens = tokens.len(), "tokenized source");
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> &SpannedToken {
        // the lexer always ends the stream with `Token::End`
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> SpannedToken {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error(&mut self, message: impl Into<String>, location: SourceLocation) {
        self.errors.push(ParseError::new(message, location));
    }

    fn error_with_help(
        &mut self,
        message: impl Into<String>,
        location: SourceLocation,
        help: impl Into<String>,
    ) {
        self.errors
            .push(ParseError::new(message, location).with_help(help));
    }

    fn literal_error(&mut self, err: LiteralError, location: SourceLocation) {
        match err.help() {
            Some(help) => self.error_with_help(err.to_string(), location, help),
            None => self.error(err.to_string(), location),
        }
    }

    /// Parse a complete program.
    pub fn parse_program(mut self) -> Result<ParsedProgram, ParseErrors> {
        let mut root = None;
        let mut seen_block = false;
        let mut memory = None;
        let mut accumulator = None;
        let mut condition = None;

        loop {
            let SpannedToken { token, location } = self.peek().clone();
            match &token {
                Token::End => break,
                Token::OpenBlock => {
                    if seen_block {
                        self.error("more than one instruction block at top-level scope", location);
                    }
                    seen_block = true;
                    let block = self.parse_block();
                    root = root.or(block);
                }
                t if t.is_memory_literal() => {
                    if memory.is_some() {
                        self.error("more than one memory literal at top-level scope", location);
                    }
                    if let Some(tree) = self.parse_literal_as_memory() {
                        if tree.value() <= 0 {
                            self.error_with_help(
                                "initial memory must contain at least one cell",
                                location,
                                "the program starts on the first child of the memory literal",
                            );
                        }
                        memory = memory.or(Some(tree));
                    }
                }
                Token::Keyword(word) if word == "a:" => {
                    self.advance();
                    if accumulator.is_some() {
                        self.error("more than one initial accumulator value", location);
                    }
                    let value = self.parse_register_seed("a:", location);
                    accumulator = accumulator.or(value);
                }
                Token::Keyword(word) if word == "c:" => {
                    self.advance();
                    if condition.is_some() {
                        self.error("more than one initial conditional value", location);
                    }
                    let value = self.parse_register_seed("c:", location);
                    condition = condition.or(value.map(|v| v != 0));
                }
                other => {
                    self.error(format!("invalid token at top-level scope `{}`", other), location);
                    self.advance();
                }
            }
        }

        if !seen_block {
            self.error_with_help(
                "program has no instruction block",
                self.peek().location,
                "wrap the program's instructions in '{' and '}'",
            );
        }

        debug!(errors = self.errors.len(), "parsed program");
        match root {
            Some(root) if self.errors.is_empty() => Ok(ParsedProgram {
                root,
                memory,
                accumulator,
                condition,
            }),
            _ => Err(ParseErrors(self.errors)),
        }
    }

    fn parse_register_seed(&mut self, name: &str, location: SourceLocation) -> Option<Num> {
        if self.peek().token.is_numeric_literal() {
            self.parse_literal_as_number()
        } else {
            let found = self.peek().token.to_string();
            self.error(
                format!("expected a numeric literal after `{}`, found `{}`", name, found),
                location,
            );
            None
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Instructions
    // ═══════════════════════════════════════════════════════════════════

    /// Parse `{ [terminator] container* }`.
    fn parse_block(&mut self) -> Option<Block> {
        let location = self.advance().location;
        let condition = self.parse_condition();
        let mut body = Vec::new();
        let mut attempted = 0usize;

        loop {
            match &self.peek().token {
                Token::CloseBlock => {
                    self.advance();
                    break;
                }
                Token::End => {
                    self.error_with_help(
                        "instruction block is not closed",
                        location,
                        "did you forget a '}'?",
                    );
                    return None;
                }
                Token::OpenBlock => {
                    attempted += 1;
                    if let Some(block) = self.parse_block() {
                        body.push(Container::Block(block));
                    }
                }
                _ => {
                    attempted += 1;
                    if let Some(instr) = self.parse_instruction() {
                        body.push(Container::Instruction(instr));
                    }
                }
            }
        }

        if body.is_empty() && attempted > 0 {
            return None;
        }
        match Block::new(condition, body) {
            Ok(block) => Some(block.at(location)),
            Err(err) => {
                self.error(err.to_string(), location);
                None
            }
        }
    }

    fn parse_instruction(&mut self) -> Option<Instruction> {
        let SpannedToken { token, location } = self.advance();
        let word = match token {
            Token::SetMemory => return self.parse_memory_setter(location),
            Token::Keyword(word) => word,
            other => {
                let message = format!("invalid instruction code `{}`", other);
                if other.is_memory_literal() || other.is_argument() {
                    self.error_with_help(message, location, "did you mean to use '.'?");
                } else {
                    self.error(message, location);
                }
                return None;
            }
        };

        let op = if self.peek().token.is_argument() {
            let arg = self.parse_argument();
            let op = arg.and_then(|arg| keywords::unary(&word, arg));
            if arg.is_some() && op.is_none() {
                self.unknown_keyword(&word, "unary", location);
            }
            op
        } else {
            let op = keywords::nullary(&word);
            if op.is_none() {
                self.unknown_keyword(&word, "nullary", location);
            }
            op
        };
        let condition = self.parse_condition();
        Some(Instruction::new(op?, condition).at(location))
    }

    fn unknown_keyword(&mut self, word: &str, arity: &str, location: SourceLocation) {
        let message = format!("unrecognized {} instruction `{}`", arity, word);
        let help = if arity == "nullary" && keywords::UNARY.contains(&word) {
            Some(format!("`{}` takes an argument", word))
        } else if arity == "unary" && keywords::NULLARY.contains(&word) {
            Some(format!("`{}` does not take an argument", word))
        } else {
            keywords::suggest(word).map(|s| format!("did you mean `{}`?", s))
        };
        match help {
            Some(help) => self.error_with_help(message, location, help),
            None => self.error(message, location),
        }
    }

    /// Parse the operand of `.`: an argument or a memory literal.
    fn parse_memory_setter(&mut self, location: SourceLocation) -> Option<Instruction> {
        let next = self.peek().token.clone();
        let op = if next.is_argument() {
            self.parse_argument().map(Op::SetValue)
        } else if next.is_memory_literal() {
            self.parse_literal_as_memory().map(Op::SetMemory)
        } else {
            self.error("invalid memory value for `.` instruction", location);
            if !matches!(next, Token::CloseBlock | Token::End) {
                self.advance();
            }
            return None;
        };
        let condition = self.parse_condition();
        Some(Instruction::new(op?, condition).at(location))
    }

    fn parse_argument(&mut self) -> Option<Argument> {
        match self.peek().token {
            Token::Variable('a') => {
                self.advance();
                Some(Argument::Accumulator)
            }
            Token::Variable(_) => {
                self.advance();
                Some(Argument::ActiveCell)
            }
            _ => self.parse_literal_as_number().map(Argument::Constant),
        }
    }

    fn parse_condition(&mut self) -> Condition {
        match self.peek().token {
            Token::Terminator(condition) => {
                self.advance();
                condition
            }
            _ => Condition::Always,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Literals
    // ═══════════════════════════════════════════════════════════════════

    fn parse_literal_as_number(&mut self) -> Option<Num> {
        let SpannedToken { token, location } = self.advance();
        let decoded = match &token {
            Token::Integer(text) => literal::parse_integer(text),
            Token::Bool(value) => Ok(Num::from(*value)),
            Token::Char { closed: false, .. } => {
                self.error_with_help(
                    format!("character literal `{}` is not closed", token),
                    location,
                    "did you forget a `'`?",
                );
                return None;
            }
            Token::Char { raw, .. } => literal::decode_char(raw),
            other => {
                self.error(format!("expected a numeric literal, found `{}`", other), location);
                return None;
            }
        };
        decoded.map_err(|err| self.literal_error(err, location)).ok()
    }

    fn parse_literal_as_memory(&mut self) -> Option<CellTree> {
        match &self.peek().token {
            Token::Str { .. } => self.parse_string_literal(),
            Token::OpenMemory => self.parse_memory_block(),
            _ => self.parse_literal_as_number().map(CellTree::new),
        }
    }

    /// Parse `"..." [& "..."]*` into a cell holding one child per byte.
    fn parse_string_literal(&mut self) -> Option<CellTree> {
        let mut bytes = Vec::new();
        let mut ok = true;

        loop {
            let SpannedToken { token, location } = self.peek().clone();
            let Token::Str { raw, closed } = &token else {
                let help = if token.is_memory_literal() {
                    "`&` can only be used to concatenate string literals"
                } else {
                    "did you use an unnecessary `&`?"
                };
                self.error_with_help(
                    format!("expected a string literal, but instead got `{}`", token),
                    location,
                    help,
                );
                return None;
            };
            self.advance();

            if !closed {
                self.error_with_help(
                    format!("string literal `{}` is not closed", token),
                    location,
                    "did you forget a `\"`?",
                );
                ok = false;
            } else {
                match literal::decode_escapes(raw) {
                    Ok(decoded) => bytes.extend(decoded),
                    Err(err) => {
                        self.literal_error(err, location);
                        ok = false;
                    }
                }
            }

            if self.peek().token == Token::Concat {
                self.advance();
            } else {
                break;
            }
        }

        ok.then(|| CellTree::from_bytes(&bytes))
    }

    /// Parse `( literal* )` into a cell whose ring holds the literals.
    fn parse_memory_block(&mut self) -> Option<CellTree> {
        let location = self.advance().location;
        let mut children = Vec::new();
        let mut ok = true;

        loop {
            let SpannedToken { token, location: at } = self.peek().clone();
            match token {
                Token::CloseMemory => {
                    self.advance();
                    break;
                }
                Token::End => {
                    self.error_with_help(
                        "memory block is not closed",
                        location,
                        "did you forget a ')'?",
                    );
                    return None;
                }
                t if t.is_memory_literal() => match self.parse_literal_as_memory() {
                    Some(child) => children.push(child),
                    None => ok = false,
                },
                other => {
                    self.error_with_help(
                        format!("invalid memory token `{}`", other),
                        at,
                        "only literal values may appear in a memory block",
                    );
                    self.advance();
                    ok = false;
                }
            }
        }

        if !ok {
            return None;
        }
        match CellTree::with_children(children) {
            Ok(tree) => Some(tree),
            Err(err) => {
                self.error(err.to_string(), location);
                None
            }
        }
    }
}

/// Parse source text into a program description.
pub fn parse(source: &str) -> Result<ParsedProgram, ParseErrors> {
    Parser::new(source).parse_program()
}
