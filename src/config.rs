use crate::error::{AppError, Result};

pub const CF_API_URL: &str = "https://codeforces.com/api";

/// How many of the latest rated contests one run walks through.
pub const DEFAULT_CONTEST_COUNT: usize = 300;

/// Pause after every successful upload so the standings source does not throttle us.
pub const DEFAULT_UPLOAD_DELAY_MS: u64 = 1500;

pub const DEFAULT_DIVISION: &str = "Div2";

/// HTTP timeout for a single API call (seconds). Large contests return tens of MB.
pub const HTTP_TIMEOUT_SECS: u64 = 60;

/// Bisection bracket and iteration count for the performance solver.
/// 5000 / 2^20 ≈ 0.005, well under the integer rounding step.
pub mod solver {
    pub const RATING_FLOOR: f64 = 0.0;
    pub const RATING_CEILING: f64 = 5000.0;
    pub const ITERATIONS: u32 = 20;
}

/// Key and secret for signed Codeforces calls.
#[derive(Clone)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub cf_api_url: String,
    /// Present only when both CF_API_KEY and CF_API_SECRET are set.
    pub credentials: Option<ApiCredentials>,
    /// Number of latest rated contests to process (CONTEST_COUNT)
    pub contest_count: usize,
    /// Label stored on every uploaded record (DIVISION)
    pub division: String,
    /// Delay after each upload in milliseconds (UPLOAD_DELAY_MS)
    pub upload_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let credentials = match (
            non_empty_var("CF_API_KEY"),
            non_empty_var("CF_API_SECRET"),
        ) {
            (Some(key), Some(secret)) => Some(ApiCredentials { key, secret }),
            _ => None,
        };

        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "contest_perf.db".to_string()),
            cf_api_url: std::env::var("CF_API_URL").unwrap_or_else(|_| CF_API_URL.to_string()),
            credentials,
            contest_count: parse_var("CONTEST_COUNT", DEFAULT_CONTEST_COUNT)?,
            division: std::env::var("DIVISION").unwrap_or_else(|_| DEFAULT_DIVISION.to_string()),
            upload_delay_ms: parse_var("UPLOAD_DELAY_MS", DEFAULT_UPLOAD_DELAY_MS)?,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    parse_value(name, std::env::var(name).ok(), default)
}

/// `raw` is the variable's value if set. Surrounding whitespace is ignored.
fn parse_value<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{name} must be a non-negative integer, got {raw:?}"))),
        None => Ok(default),
    }
}
