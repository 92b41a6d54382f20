//! Default configuration values

/// Settings file looked up when `--config` is not given
pub const SETTINGS_FILE: &str = "apptester.toml";

/// Maximum number of attempts per HTTP request
pub const MAX_REQUEST_RETRIES: u32 = 3;

/// Base delay for exponential backoff between attempts (in milliseconds)
pub const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Upper bound for a single backoff delay (in milliseconds)
pub const RETRY_MAX_DELAY_MS: u64 = 30_000;

/// Whole-request timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Connection establishment timeout (in seconds)
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Directory inside a build tree where the SDK archive is placed.
/// Sample applications reference this path from their build files.
pub const SDK_DIR: &str = "libs/kaa";

/// Shell used to run build commands
pub const BUILD_SHELL: &str = "bash";

/// Column width of the results table
pub const RESULT_COLUMN_WIDTH: usize = 40;
