// Shared error type for the provider clients
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },
}
