//! Clients for the two hosted Google APIs the service proxies.
//!
//! Both are plain reqwest JSON clients with typed response structs. No
//! retry logic anywhere: any failure surfaces immediately to the
//! handler, which maps it onto an error response.

pub mod gemini;
pub mod pagespeed;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network failure, timeout, or a body that failed to decode.
    #[error("falha de rede: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer from the upstream service.
    #[error("resposta {status} do serviço")]
    Status { status: reqwest::StatusCode },
}
