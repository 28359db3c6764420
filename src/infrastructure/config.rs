use std::env;
use std::time::Duration;

pub const DEFAULT_GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com/books/v1";
pub const DEFAULT_OPENBD_BASE_URL: &str = "https://api.openbd.jp/v1";
pub const DEFAULT_NDL_BASE_URL: &str = "https://iss.ndl.go.jp/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub google_books_base_url: String,
    pub openbd_base_url: String,
    pub ndl_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup (process env, a map in tests, ...)
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = |key: &str, default: &str| {
            var(key)
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let timeout_secs = var("LOOKUP_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            google_books_base_url: base_url("GOOGLE_BOOKS_BASE_URL", DEFAULT_GOOGLE_BOOKS_BASE_URL),
            openbd_base_url: base_url("OPENBD_BASE_URL", DEFAULT_OPENBD_BASE_URL),
            ndl_base_url: base_url("NDL_BASE_URL", DEFAULT_NDL_BASE_URL),
            timeout: Duration::from_secs(timeout_secs),
            user_agent: var("LOOKUP_USER_AGENT")
                .unwrap_or_else(|| format!("isbn-lookup/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}
