//! Spherehorn: a register-and-tape language whose tape is a tree of rings.

// ═══════════════════════════════════════════════════════════════════════════
// Layer 0: Core (No internal dependencies)
// ═══════════════════════════════════════════════════════════════════════════
pub mod core;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 1: Front end (depends on core)
// ═══════════════════════════════════════════════════════════════════════════
pub mod ast;
pub mod parser;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 2: Runtime (depends on core)
// ═══════════════════════════════════════════════════════════════════════════
pub mod runtime;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 3: VM (depends on core, front end, runtime)
// ═══════════════════════════════════════════════════════════════════════════
pub mod vm;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 4: Program (depends on all)
// ═══════════════════════════════════════════════════════════════════════════
pub mod program;

pub use crate::core::error::{
    AbortReason, ErrorCategory, MemoryError, ParseError, ParseErrors, Result, SourceLocation,
    SpherehornError,
};
pub use crate::core::{CellId, CellSnapshot, CellTree, ChildArc, Memory, Num, ProgramState};

pub use ast::{Argument, Block, Condition, Container, Instruction, Op};
pub use parser::{parse, tokenize, ParsedProgram, Parser};
pub use program::Program;
pub use runtime::io::{IOContext, IOStats};
pub use vm::{Abort, Executor, ExecutorConfig, Status};
