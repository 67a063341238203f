use thiserror::Error;

/// Errors that can occur when making requests to the Union API
#[derive(Debug, Error)]
pub enum HeytapRequestError {
    /// Token acquisition failed, either because the platform rejected the
    /// credentials or because the token endpoint was unreachable. The token
    /// cache is left empty so the next call retries from scratch.
    #[error("token acquisition failed: {message}")]
    Auth {
        /// Platform message, or a transport description when no response
        /// body was available.
        message: String,
    },

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    /// The platform returned a business error code in its envelope. Raised
    /// only when a caller asks for it via
    /// [`crate::response::ApiEnvelope::require_success`]; the domain
    /// operations themselves hand back the envelope.
    #[error("platform error {code}: {message}")]
    Platform {
        /// Envelope `code`, `-1` when the failure was local.
        code: i64,
        /// Envelope `message`, preserved verbatim.
        message: String,
    },

    /// Caller supplied inconsistent parameters. Raised before any network
    /// call is made.
    #[error("invalid request: {0}")]
    Validation(String),
}
