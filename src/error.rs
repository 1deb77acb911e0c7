//! Error types for the advisory engine

use thiserror::Error;

/// Result type alias for advisory operations
pub type Result<T> = std::result::Result<T, AdvisoryError>;

#[derive(Error, Debug)]
pub enum AdvisoryError {

    // =============================
    // Caller-facing errors
    // =============================

    /// Required identity fields (id, name) could not be resolved.
    /// Surfaces to collaborators as a 404-equivalent.
    #[error("Profile incomplete: {0}")]
    ProfileIncomplete(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Raised only when fallback synthesis is disabled by configuration;
    /// otherwise every provider failure is absorbed into a fallback response.
    #[error("Advisory provider unavailable: {0}")]
    UpstreamUnavailable(String),

    // =============================
    // Internal errors (absorbed before the orchestrator boundary)
    // =============================

    #[error("Request signing error: {0}")]
    Signing(String),

    #[error("Advisory provider timed out: {0}")]
    UpstreamTimeout(String),

    #[error("Advisory provider rejected request: {0}")]
    UpstreamRejected(String),

    #[error("Corrupt cache entry: {0}")]
    CacheCorruption(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AdvisoryError {
    /// True for failures the gateway converts into fallback synthesis
    /// rather than surfacing to the caller.
    pub fn is_absorbable(&self) -> bool {
        matches!(
            self,
            AdvisoryError::Signing(_)
                | AdvisoryError::UpstreamTimeout(_)
                | AdvisoryError::UpstreamRejected(_)
                | AdvisoryError::Http(_)
        )
    }
}
