//! Shared test utilities for Spherehorn integration tests.
//!
//! This module provides:
//! - Program parsing helpers
//! - Run helpers over in-memory I/O
//! - Assertion helpers for run outcomes
//!
//! ## AAA Pattern
//!
//! All tests follow the Arrange-Act-Assert pattern:
//! - Arrange: Set up source, input and configuration
//! - Act: Run the program
//! - Assert: Verify status, registers, memory and output

#![allow(dead_code)]

use spherehorn::*;

// =============================================================================
// Program Parsing Utilities
// =============================================================================

/// Parse Spherehorn source into a Program.
///
/// # Panics
/// Panics if parsing fails, which is appropriate for test code.
pub fn build(code: &str) -> Program {
    Program::parse(code).expect("Failed to parse program")
}

/// Parse and return every diagnostic message, or an empty list.
pub fn parse_messages(code: &str) -> Vec<String> {
    match Program::parse(code) {
        Ok(_) => Vec::new(),
        Err(SpherehornError::Parse(errors)) => errors.iter().map(|e| e.message.clone()).collect(),
        Err(other) => vec![other.to_string()],
    }
}

// =============================================================================
// Execution Utilities
// =============================================================================

/// Result of running a program against buffered I/O.
pub struct RunResult {
    pub program: Program,
    pub status: Status,
    pub output: Vec<u8>,
}

impl RunResult {
    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn acc(&self) -> Num {
        self.program.state().acc
    }

    pub fn cond(&self) -> bool {
        self.program.state().cond
    }

    /// Value of the cell under the tape head.
    pub fn active_value(&self) -> Num {
        self.program.memory().value(self.program.state().active)
    }

    pub fn abort_reason(&self) -> Option<AbortReason> {
        self.program.abort().map(|abort| abort.reason.clone())
    }
}

/// Run source with the given stdin bytes.
pub fn run_with_input(code: &str, input: &str) -> RunResult {
    run_configured(code, input, ExecutorConfig::default())
}

/// Run source with empty stdin.
pub fn run(code: &str) -> RunResult {
    run_with_input(code, "")
}

/// Run source under a step limit so runaway loops fail fast.
pub fn run_limited(code: &str, max_steps: u64) -> RunResult {
    run_configured(code, "", ExecutorConfig::with_max_steps(max_steps))
}

pub fn run_configured(code: &str, input: &str, config: ExecutorConfig) -> RunResult {
    let mut program = build(code);
    let mut io = IOContext::buffered(input);
    let status = program.run_with(&mut io, config).expect("first run");
    RunResult {
        program,
        status,
        output: io.take_output(),
    }
}

// =============================================================================
// Assertion Helpers
// =============================================================================

/// Assert the program ended gracefully.
pub fn assert_exit(result: &RunResult) {
    assert_eq!(
        result.status,
        Status::Exit,
        "expected graceful exit, aborted with {:?}",
        result.program.abort()
    );
}

/// Assert the program aborted for the given reason.
pub fn assert_abort(result: &RunResult, reason: AbortReason) {
    assert_eq!(result.status, Status::Abort);
    assert_eq!(result.abort_reason(), Some(reason));
}

pub fn assert_output(result: &RunResult, expected: &str) {
    assert_eq!(result.output_str(), expected);
}
