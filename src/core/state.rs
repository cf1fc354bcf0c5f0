//! Registers of a running program.

use super::memory::{CellId, Num};

/// The mutable execution context threaded through every instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramState {
    /// Accumulator register.
    pub acc: Num,
    /// Condition register.
    pub cond: bool,
    /// Tape head.
    pub active: CellId,
}

impl ProgramState {
    /// Fresh registers (0 / false) with the tape head on `active`.
    pub fn new(active: CellId) -> Self {
        Self {
            acc: 0,
            cond: false,
            active,
        }
    }

    pub fn with_registers(active: CellId, acc: Num, cond: bool) -> Self {
        Self { acc, cond, active }
    }
}
