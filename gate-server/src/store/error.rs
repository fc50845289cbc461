//! Document store error types.

/// Errors from saving or loading a profile record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The store refused the request or the record
    #[error("store rejected the request (status {status}): {reason}")]
    ServerRejected { status: u16, reason: String },

    /// No record exists for the requested user
    #[error("profile not found")]
    NotFound,

    /// Invalid API key or unauthorized
    #[error("unauthorized: check GATEMATE_API_KEY")]
    Unauthorized,

    /// Response body could not be understood
    #[error("malformed store response: {message}")]
    Malformed { message: String },

    /// Client could not be configured
    #[error("store client misconfigured: {0}")]
    Config(String),
}

/// Errors from an airport-scoped candidate query.
///
/// Individual malformed records never produce an error; they are dropped.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response as a whole could not be parsed
    #[error("malformed query response: {message}")]
    MalformedSchema { message: String },

    /// The store refused the query
    #[error("store rejected the query (status {status}): {reason}")]
    ServerRejected { status: u16, reason: String },

    /// Invalid API key or unauthorized
    #[error("unauthorized: check GATEMATE_API_KEY")]
    Unauthorized,
}
