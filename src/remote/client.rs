//! Management server client
//!
//! Wraps the three authenticated REST calls apptester needs: listing
//! applications, reading the SDK profiles of an application and downloading a
//! generated SDK.

use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use futures::StreamExt;
use reqwest::{RequestBuilder, Response};
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::{defaults, urls};
use crate::core::descriptor::SdkLanguage;
use crate::error::RemoteError;
use crate::remote::models::{Application, Credentials, ProfileId, SdkProfile, ServerHandle};

/// Timeouts and retry budget of the HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Whole-request timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// Maximum attempts per request
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds)
    pub base_delay_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS),
            max_retries: defaults::MAX_REQUEST_RETRIES,
            base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
        }
    }
}

/// Downloaded SDK archive
#[derive(Debug)]
pub struct DownloadResult {
    /// Size in bytes
    pub size: u64,
    /// SHA256 checksum of the downloaded content
    pub checksum: String,
}

/// Client for the management server REST API
#[derive(Debug, Clone)]
pub struct RemoteClient {
    /// HTTP client
    client: reqwest::Client,
    /// Server address
    server: ServerHandle,
    /// Retry settings
    options: ClientOptions,
}

impl RemoteClient {
    /// Create a client with default timeouts and retries
    pub fn new(server: ServerHandle) -> Result<Self, RemoteError> {
        Self::with_options(server, ClientOptions::default())
    }

    /// Create a client with custom timeouts and retries
    pub fn with_options(server: ServerHandle, options: ClientOptions) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .build()
            .map_err(|e| RemoteError::Client {
                error: e.to_string(),
            })?;

        Ok(Self {
            client,
            server,
            options,
        })
    }

    /// List the applications visible to `credentials`
    pub async fn list_applications(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Application>, RemoteError> {
        let url = format!("{}{}", self.server.base_url(), urls::APPLICATIONS);
        let response = self
            .send("Listing applications", &url, || {
                self.client
                    .get(&url)
                    .basic_auth(&credentials.username, Some(&credentials.password))
            })
            .await?;

        decode_json(&url, response).await
    }

    /// Get the SDK profiles of the application called `application_name`
    ///
    /// The name is resolved to an application token through
    /// [`Self::list_applications`]; the first exact match wins.
    pub async fn get_sdk_profiles(
        &self,
        application_name: &str,
        credentials: &Credentials,
    ) -> Result<Vec<SdkProfile>, RemoteError> {
        let applications = self.list_applications(credentials).await?;
        let token = applications
            .into_iter()
            .find(|app| app.name == application_name)
            .map(|app| app.application_token)
            .ok_or_else(|| RemoteError::ApplicationNotFound {
                name: application_name.to_string(),
            })?;

        tracing::debug!("Application '{application_name}' has token {token}");

        let url = format!("{}{}/{token}", self.server.base_url(), urls::SDK_PROFILES);
        let response = self
            .send("Getting SDK profiles", &url, || {
                self.client
                    .get(&url)
                    .basic_auth(&credentials.username, Some(&credentials.password))
            })
            .await?;

        decode_json(&url, response).await
    }

    /// Generate the SDK of `profile_id` for `language` and write it to `dest`
    ///
    /// An existing file at `dest` is overwritten; a partial file is removed
    /// when the transfer fails.
    pub async fn download_sdk(
        &self,
        profile_id: &ProfileId,
        language: SdkLanguage,
        credentials: &Credentials,
        dest: &Path,
    ) -> Result<DownloadResult, RemoteError> {
        let url = format!("{}{}", self.server.base_url(), urls::SDK);
        let query = [
            ("sdkProfileId", profile_id.to_string()),
            ("targetPlatform", language.target_platform().to_string()),
        ];

        let response = self
            .send("Downloading SDK", &url, || {
                self.client
                    .post(&url)
                    .query(&query)
                    .basic_auth(&credentials.username, Some(&credentials.password))
            })
            .await?;

        match write_body(&url, response, dest).await {
            Ok(result) => {
                tracing::debug!(
                    "Downloaded {} SDK ({} bytes, sha256 {}) to {}",
                    language,
                    result.size,
                    result.checksum,
                    dest.display()
                );
                Ok(result)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(dest).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            "Could not remove partial download {}: {cleanup}",
                            dest.display()
                        );
                    }
                }
                Err(e)
            }
        }
    }

    /// Send a request, retrying network errors and 5xx responses
    async fn send<F>(
        &self,
        operation: &'static str,
        url: &str,
        request: F,
    ) -> Result<Response, RemoteError>
    where
        F: Fn() -> RequestBuilder,
    {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.options.base_delay_ms))
            .with_max_interval(Duration::from_millis(defaults::RETRY_MAX_DELAY_MS))
            .with_max_elapsed_time(None)
            .build();

        let max_attempts = self.options.max_retries.max(1);
        let mut attempts = 0;

        backoff::future::retry(policy, || {
            attempts += 1;
            let attempt = attempts;
            let request = request();

            async move {
                let transient_or_final = |err: RemoteError| {
                    if attempt < max_attempts {
                        tracing::warn!("{operation} (attempt {attempt}/{max_attempts}): {err}");
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                };

                let response = request.send().await.map_err(|e| {
                    transient_or_final(RemoteError::Network {
                        url: url.to_string(),
                        error: e.to_string(),
                    })
                })?;

                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                let err = RemoteError::Status {
                    operation,
                    url: url.to_string(),
                    status: status.as_u16(),
                };
                if status.is_server_error() {
                    Err(transient_or_final(err))
                } else {
                    Err(backoff::Error::permanent(err))
                }
            }
        })
        .await
    }
}

/// Decode a JSON response body
async fn decode_json<T>(url: &str, response: Response) -> Result<T, RemoteError>
where
    T: serde::de::DeserializeOwned,
{
    response.json().await.map_err(|e| RemoteError::Decode {
        url: url.to_string(),
        error: e.to_string(),
    })
}

/// Stream a response body into `dest`
async fn write_body(url: &str, response: Response, dest: &Path) -> Result<DownloadResult, RemoteError> {
    let io_error = |e: std::io::Error| RemoteError::Io {
        path: dest.to_path_buf(),
        error: e.to_string(),
    };

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| RemoteError::Io {
            path: parent.to_path_buf(),
            error: e.to_string(),
        })?;
    }

    let mut file = File::create(dest).await.map_err(io_error)?;
    let mut hasher = Sha256::new();
    let mut size: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| RemoteError::Network {
            url: url.to_string(),
            error: e.to_string(),
        })?;
        file.write_all(&chunk).await.map_err(io_error)?;
        hasher.update(&chunk);
        size += chunk.len() as u64;
    }

    file.flush().await.map_err(io_error)?;

    Ok(DownloadResult {
        size,
        checksum: hex::encode(hasher.finalize()),
    })
}
