//! apptester - build verification for Kaa sample applications
//!
//! Reads an application matrix, prepares one build tree per
//! (application, language, platform) combination with an SDK generated by
//! the Kaa server, runs each build command and reports the results.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Settings, matrix expansion, build units and orchestration
//! - [`remote`] - Management server REST client
//! - [`infra`] - Infrastructure layer (filesystem, processes)
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
pub mod remote;
