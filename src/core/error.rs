//! Error types for Spherehorn.
//!
//! Three families of failure exist, split by who handles them:
//!
//! - **`SpherehornError`**: failures of the host-facing API (parsing, building,
//!   re-running a program, host I/O). Returned through `Result`.
//! - **`MemoryError`**: structural misuse of the cell arena, e.g. asking a
//!   zero-valued cell for its child or a top-level cell for its sibling.
//! - **`AbortReason`**: why a running program stopped with `Status::Abort`.
//!   These are in-band program failures, never host errors.
//!
//! # Error Categories
//!
//! [`ErrorCategory`] groups host errors so the CLI can pick an exit code
//! without matching on every variant.

use std::fmt;

use thiserror::Error;

use super::memory::{CellId, Num};

/// Source location for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Line number (1-indexed, 0 when unknown).
    pub line: usize,
    /// Column number (1-indexed, 0 when unknown).
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Whether this location points at real source text.
    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "line {}:{}", self.line, self.column)
        } else {
            write!(f, "unknown location")
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Parse Errors
// ═══════════════════════════════════════════════════════════════════════════

/// A single parse diagnostic with location and an optional hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message.
    pub message: String,
    /// Where the offending token starts.
    pub location: SourceLocation,
    /// Optional hint shown below the message.
    pub help: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
            help: None,
        }
    }

    /// Add a hint.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_known() {
            write!(f, "Parse error: {} ({})", self.message, self.location)?;
        } else {
            write!(f, "Parse error: {}", self.message)?;
        }
        if let Some(help) = &self.help {
            write!(f, "\n -> Hint: {}", help)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Every diagnostic collected while parsing one source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Memory Errors
// ═══════════════════════════════════════════════════════════════════════════

/// Structural misuse of the cell arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Sibling operations need a parent ring; top-level cells have none.
    #[error("cell {cell} is a top-level cell and has no siblings")]
    Detached { cell: CellId },

    /// Only cells with a positive value own a ring of children.
    #[error("cell {cell} has value {value} and therefore no children")]
    NoChildren { cell: CellId, value: Num },

    /// `insert_child` only accepts cells that are not yet part of a tree.
    #[error("cell {cell} already belongs to a tree")]
    NotDetached { cell: CellId },

    /// A subtree cannot be moved into or out of itself.
    #[error("cells {dst} and {src} lie on the same branch")]
    Overlap { dst: CellId, src: CellId },
}

// ═══════════════════════════════════════════════════════════════════════════
// Abort Reasons
// ═══════════════════════════════════════════════════════════════════════════

/// Why a program ended with `Status::Abort`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortReason {
    #[error("attempted decrement past zero")]
    DecrementPastZero,

    #[error("attempted to perform invalid SUB ( {minuend} - {subtrahend} )")]
    NegativeDifference { minuend: Num, subtrahend: Num },

    #[error("attempted to perform DIV by zero ( {dividend} / 0 )")]
    DivisionByZero { dividend: Num },

    #[error("attempted to perform MOD by zero ( {dividend} % 0 )")]
    ModuloByZero { dividend: Num },

    #[error("attempted to enter child of cell with value {value}")]
    EmptyDescent { value: Num },

    #[error("attempted chout of invalid character ( #{value} )")]
    InvalidCharacter { value: Num },

    #[error("invalid memory operation: {0}")]
    Memory(#[from] MemoryError),

    #[error("step limit of {limit} instructions exceeded")]
    StepLimit { limit: u64 },

    #[error("I/O failure: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for AbortReason {
    fn from(err: std::io::Error) -> Self {
        AbortReason::Io {
            message: err.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Host Errors
// ═══════════════════════════════════════════════════════════════════════════

/// Error type for the host-facing Spherehorn API.
#[derive(Debug, Error)]
pub enum SpherehornError {
    /// One or more parse diagnostics; the program was not built.
    #[error("{0}")]
    Parse(ParseErrors),

    /// `Program::run` was called a second time.
    #[error("attempted to re-run a program")]
    AlreadyRun,

    /// Instruction blocks must contain at least one container.
    #[error("instruction block must contain at least one instruction")]
    EmptyBlock,

    /// The initial memory tree owns no cell to start on.
    #[error("initial memory must contain at least one cell")]
    EmptyMemory,

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ParseErrors> for SpherehornError {
    fn from(errors: ParseErrors) -> Self {
        SpherehornError::Parse(errors)
    }
}

impl SpherehornError {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SpherehornError::Parse(_) => ErrorCategory::Parse,
            SpherehornError::EmptyBlock | SpherehornError::EmptyMemory => ErrorCategory::Build,
            SpherehornError::AlreadyRun => ErrorCategory::Usage,
            SpherehornError::Memory(_) => ErrorCategory::Memory,
            SpherehornError::Io(_) => ErrorCategory::Io,
        }
    }
}

/// Error category for routing host errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Parse,
    Build,
    Usage,
    Memory,
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Parse => write!(f, "parse"),
            ErrorCategory::Build => write!(f, "build"),
            ErrorCategory::Usage => write!(f, "usage"),
            ErrorCategory::Memory => write!(f, "memory"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Result type alias for Spherehorn operations.
pub type Result<T> = std::result::Result<T, SpherehornError>;
