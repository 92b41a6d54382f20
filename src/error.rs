//! Error types for apptester
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Settings and application matrix errors
///
/// These are fatal: a run never starts building when one of them occurs.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file
    #[error("Failed to read '{path}': {error}")]
    ReadError { path: PathBuf, error: String },

    /// Failed to parse a configuration file
    #[error("Failed to parse '{path}': {error}")]
    ParseError { path: PathBuf, error: String },

    /// Matrix entry has the wrong shape
    #[error("Invalid entry '{entry}': {error}")]
    InvalidEntry { entry: String, error: String },

    /// Language key is not one the server can generate an SDK for
    #[error("Application '{application}' uses unknown language '{language}' (expected c, cpp, java or objc)")]
    UnknownLanguage {
        application: String,
        language: String,
    },

    /// `-a` named an application that is not in the matrix
    #[error("Application '{name}' is not present in the application matrix")]
    UnknownApplication { name: String },

    /// Two matrix entries describe the same build unit
    #[error("'{second}' builds the same unit as '{first}': {unit}")]
    DuplicateUnit {
        unit: String,
        first: String,
        second: String,
    },
}

/// Management server errors
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Request could not be sent or the response could not be read
    #[error("Network error for '{url}': {error}")]
    Network { url: String, error: String },

    /// Server answered with a non-success status
    #[error("{operation} failed for '{url}': HTTP {status}")]
    Status {
        operation: &'static str,
        url: String,
        status: u16,
    },

    /// Response body is not what the endpoint documents
    #[error("Unexpected response from '{url}': {error}")]
    Decode { url: String, error: String },

    /// No application with the requested name
    #[error("Application \"{name}\" was not found on the server")]
    ApplicationNotFound { name: String },

    /// Application exists but has no SDK profile to build from
    #[error("Application \"{name}\" has no SDK profiles")]
    NoSdkProfiles { name: String },

    /// HTTP client could not be constructed
    #[error("Failed to create HTTP client: {error}")]
    Client { error: String },

    /// Writing the downloaded artifact failed
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Build command errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Shell used for build commands is not installed
    #[error("Shell '{shell}' not found in PATH")]
    ShellNotFound { shell: String },

    /// Build command could not be started
    #[error("Failed to start `{command}` in '{dir}': {error}")]
    Spawn {
        command: String,
        dir: PathBuf,
        error: String,
    },

    /// Reading the command output failed
    #[error("Failed to read output of `{command}`: {error}")]
    Output { command: String, error: String },

    /// Build command exited unsuccessfully
    #[error("Build command `{command}` failed in '{dir}' ({status})")]
    CommandFailed {
        command: String,
        dir: PathBuf,
        status: String,
    },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Destination of a tree copy already exists
    #[error("Destination '{path}' already exists")]
    AlreadyExists { path: PathBuf },

    /// Source of a copy does not exist
    #[error("Source '{path}' does not exist")]
    NotFound { path: PathBuf },

    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to copy a file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to walk a source tree
    #[error("Failed to read '{path}': {error}")]
    Walk { path: PathBuf, error: String },
}

/// Top-level apptester error type
#[derive(Error, Debug)]
pub enum AppTesterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote server error
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}
