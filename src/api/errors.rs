use std::fmt;

/// Transport-level failure of a single HTTP call.
#[derive(Debug)]
pub enum ApiError {
    /// The server answered with a status we don't treat as success.
    Status { status: u16, body: String },
    Timeout(String),
    Transport(String),
    DecodeError(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The upstream body for status errors, or the failure message otherwise.
    pub fn into_detail(self) -> String {
        match self {
            ApiError::Status { body, .. } => body,
            other => other.to_string(),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_decode() {
            ApiError::DecodeError(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            ApiError::Timeout(msg) => write!(f, "Request timed out: {msg}"),
            ApiError::Transport(msg) => write!(f, "Transport error: {msg}"),
            ApiError::DecodeError(msg) => write!(f, "Decoding Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
