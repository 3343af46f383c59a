/// Application-level constants
pub const APP_NAME: &str = "TriageCare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "triagecare=info,tower_http=warn"
}

/// Default bind address for the HTTP API.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8686";

/// Maximum accepted chat message length, in characters. The same bound
/// caps the free-text portion of the generation prompt.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Request timeout for the remote text-generation backend. Expiry is
/// treated as a fallback failure and recovered locally.
pub const GENERATION_TIMEOUT_SECS: u64 = 10;

/// Environment variables configuring the generation backend.
pub const ENV_GENERATION_URL: &str = "TRIAGECARE_GENERATION_URL";
pub const ENV_GENERATION_API_KEY: &str = "TRIAGECARE_GENERATION_API_KEY";
pub const ENV_GENERATION_MODEL: &str = "TRIAGECARE_GENERATION_MODEL";

/// Defaults for the generation backend.
pub const DEFAULT_GENERATION_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-1.5-flash";
