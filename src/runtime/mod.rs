//! Runtime layer for Spherehorn.
//!
//! - **IO**: the input and output streams a program reads and writes

pub mod io;

pub use io::{IOContext, IOStats};
