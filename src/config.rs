//! Application configuration read once at startup.
//!
//! Every external dependency is optional: a missing value disables the
//! endpoints that need it instead of aborting the process.

/// Environment-derived configuration, constructed once in `run()` and
/// passed into the application state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub pagespeed_api_key: Option<String>,
    pub host: String,
    pub port: u16,
}

fn non_empty(var: &str) -> Option<String> {
    non_empty_value(std::env::var(var).ok())
}

fn non_empty_value(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: non_empty("DATABASE_URL"),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            pagespeed_api_key: non_empty("PAGESPEED_API_KEY"),
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3001),
        }
    }
}
