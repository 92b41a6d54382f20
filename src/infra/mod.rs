//! Infrastructure layer
//!
//! Handles filesystem work and external processes.

pub mod filesystem;
pub mod process;
