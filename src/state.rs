//! Shared application state.
//!
//! All runtime dependencies (database pool, upstream API clients) are
//! constructed once at startup and handed to request handlers through
//! axum's `State` extractor. A dependency that was not configured is
//! simply `None`; handlers degrade into 503 responses instead of
//! panicking or crashing the process.

use sqlx::PgPool;

use crate::clients::{gemini::GeminiClient, pagespeed::PageSpeedClient};
use crate::config::AppConfig;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db: Option<PgPool>,
    pub pagespeed: Option<PageSpeedClient>,
    pub gemini: Option<GeminiClient>,
}

impl AppState {
    pub fn new(config: &AppConfig, db: Option<PgPool>) -> Self {
        // One reqwest client shared by both upstream APIs; per-request
        // timeouts are applied only where the contract requires one.
        let http = reqwest::Client::new();

        Self {
            db,
            pagespeed: config
                .pagespeed_api_key
                .as_ref()
                .map(|key| PageSpeedClient::new(http.clone(), key.clone())),
            gemini: config
                .gemini_api_key
                .as_ref()
                .map(|key| GeminiClient::new(http.clone(), key.clone())),
        }
    }

    /// State with every dependency absent (used by tests).
    pub fn empty() -> Self {
        Self {
            db: None,
            pagespeed: None,
            gemini: None,
        }
    }

    /// The database pool, or a 503 for handlers that need one.
    pub fn pool(&self) -> Result<&PgPool, ApiError> {
        self.db
            .as_ref()
            .ok_or_else(|| ApiError::Unavailable("banco de dados não configurado".to_string()))
    }
}
