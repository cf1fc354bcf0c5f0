//! Core types for the Spherehorn interpreter.
//!
//! - **Memory**: the arena-backed ring-tree ("tape of tapes")
//! - **CellTree / CellSnapshot**: standalone literal trees and structural images
//! - **ProgramState**: accumulator, condition register and tape head
//! - **Error**: host errors, memory misuse and abort reasons
//!
//! # Layer 0 - No Internal Dependencies
//!
//! This module has no dependencies on other Spherehorn modules,
//! allowing it to be imported by all other layers.

pub mod error;
pub mod memory;
pub mod state;
pub mod tree;

pub use error::{
    AbortReason, ErrorCategory, MemoryError, ParseError, ParseErrors, Result, SourceLocation,
    SpherehornError,
};
pub use memory::{CellId, ChildArc, Memory, Num};
pub use state::ProgramState;
pub use tree::{CellSnapshot, CellTree};
