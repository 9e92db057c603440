use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status. Displays as the raw body.
    #[error("{body}")]
    RequestFailed { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API base URL: {0:?}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status of a rejected request, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
