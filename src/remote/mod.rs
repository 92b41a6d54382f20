//! Management server client
//!
//! Handles the authenticated REST calls made against the Kaa server.

pub mod client;
pub mod models;

pub use client::{ClientOptions, DownloadResult, RemoteClient};
pub use models::{Application, Credentials, ProfileId, SdkProfile, ServerHandle};
