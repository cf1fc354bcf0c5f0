//! Integration tests for Spherehorn.
//!
//! This module organises integration tests by component.

pub mod cli;
pub mod memory;
pub mod programs;
pub mod vm;
