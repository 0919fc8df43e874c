//! API error types.

use thiserror::Error;

/// Errors returned by [`super::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response: DNS, connect or I/O failure
    #[error("Could not reach server: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Non-success HTTP status. Displays the server's message verbatim.
    #[error("{}", status_text(.status, .message))]
    Status { status: u16, message: Option<String> },

    /// Success status but the body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Rejected locally, nothing was sent
    #[error("{0}")]
    InvalidRequest(String),
}

fn status_text(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("Request failed with status {}", status),
    }
}

impl ApiError {
    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::MalformedResponse(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
