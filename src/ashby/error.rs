use thiserror::Error;

/// Failures surfaced by a remote call.
///
/// Every variant except `Cancelled` names the operation that failed so the
/// caller can print a precise diagnostic. None of these are retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure before a response arrived
    #[error("{operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: invalid or missing API key (401)")]
    Unauthorized { operation: String },

    #[error("{operation}: API key lacks required permissions (403)")]
    Forbidden { operation: String },

    /// Any other non-2xx status
    #[error("{operation}: HTTP {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    /// Well-formed response with `success: false`
    #[error("{operation}: API error: {message}")]
    Api { operation: String, message: String },

    /// The response could not be parsed into the expected shape
    #[error("{operation}: decode response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// A page fetch failed part way through pagination
    #[error("paginate {operation} (page {page}): {source}")]
    Page {
        operation: String,
        page: usize,
        #[source]
        source: Box<ApiError>,
    },

    #[error("operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// True when the failure was caused by the cancellation signal,
    /// including cancellations wrapped with page context.
    pub fn is_cancelled(&self) -> bool {
        match self {
            ApiError::Cancelled => true,
            ApiError::Page { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// True for 401/403 responses, wherever they occurred.
    pub fn is_auth(&self) -> bool {
        match self {
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => true,
            ApiError::Page { source, .. } => source.is_auth(),
            _ => false,
        }
    }
}
