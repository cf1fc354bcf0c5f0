//! Virtual machine for Spherehorn instruction trees.
//!
//! # Architecture
//!
//! The executor walks the instruction tree directly. Containers return a
//! [`Status`]; blocks loop over their members until something other than
//! `Okay` comes back, absorbing `Break` and forwarding `Exit` and `Abort`.
//! Registers live in a [`ProgramState`](crate::core::ProgramState) threaded by
//! mutable reference, memory and I/O are borrowed for the executor's lifetime.

pub mod executor;

pub use executor::{Abort, Executor, ExecutorConfig, Status};
