//! Request-level error taxonomy.

use thiserror::Error;

/// Errors a calendar request can surface to the client. Everything
/// else is an internal failure handled at the API boundary.
#[derive(Debug, Error)]
pub enum CalError {
    /// The name matched no configured alias and is not a valid direct
    /// feed reference.
    #[error("Invalid calendar name")]
    InvalidReference,

    /// Any failure while fetching or parsing the feed. Carries the
    /// underlying message verbatim for the client.
    #[error("{0}")]
    Feed(String),

    /// A request parameter that cannot be resolved, e.g. an unknown
    /// timezone identifier or locale tag.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl CalError {
    /// The HTTP status this error surfaces as.
    pub fn status_code(&self) -> u16 {
        match self {
            CalError::InvalidReference => 404,
            CalError::Feed(_) | CalError::InvalidParameter(_) => 400,
        }
    }
}
