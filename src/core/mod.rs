//! Core logic
//!
//! # Submodules
//!
//! - [`settings`] - Top-level settings file
//! - [`matrix`] - Application matrix parsing
//! - [`descriptor`] - Application descriptors and unit keys
//! - [`unit`] - Build environment preparation and build execution
//! - [`orchestrator`] - Sequential run over all build units
//! - [`report`] - Result table

pub mod descriptor;
pub mod matrix;
pub mod orchestrator;
pub mod report;
pub mod settings;
pub mod unit;
