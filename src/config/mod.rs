//! Configuration constants
//!
//! Defaults for the HTTP client and build layout, and the REST paths of the
//! management server.

pub mod defaults;
pub mod urls;
