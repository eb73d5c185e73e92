use crate::api::errors::ApiError;
use config::ConfigError;
use thiserror::Error;

/// Central error type for the CLI.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] NotAuthenticatedError),

    #[error(transparent)]
    Exchange(#[from] AuthExchangeError),

    #[error(transparent)]
    Upstream(#[from] UpstreamApiError),

    #[error("Failed to receive authorization code callback")]
    Callback,

    #[error("{0}")]
    Other(String),
}

/// The authorization server rejected a code or refresh token, or could not
/// be reached at all (`status` is `None` then).
#[derive(Error, Debug)]
#[error("Token exchange failed ({}): {body}", describe_status(.status))]
pub struct AuthExchangeError {
    pub status: Option<u16>,
    pub body: String,
}

impl From<ApiError> for AuthExchangeError {
    fn from(err: ApiError) -> Self {
        AuthExchangeError {
            status: err.status(),
            body: err.into_detail(),
        }
    }
}

/// No usable credential is available.
#[derive(Error, Debug)]
#[error("Not authenticated: {reason}")]
pub struct NotAuthenticatedError {
    pub reason: String,
    #[source]
    pub source: Option<AuthExchangeError>,
}

impl NotAuthenticatedError {
    pub fn no_refresh_token() -> Self {
        NotAuthenticatedError {
            reason: "no refresh token".into(),
            source: None,
        }
    }

    pub fn refresh_failed(source: AuthExchangeError) -> Self {
        NotAuthenticatedError {
            reason: format!("refresh failed: {source}"),
            source: Some(source),
        }
    }
}

/// The currently-playing call failed for a reason other than "nothing playing".
#[derive(Error, Debug)]
#[error("Spotify API error ({}): {body}", describe_status(.status))]
pub struct UpstreamApiError {
    pub status: Option<u16>,
    pub body: String,
}

impl From<ApiError> for UpstreamApiError {
    fn from(err: ApiError) -> Self {
        UpstreamApiError {
            status: err.status(),
            body: err.into_detail(),
        }
    }
}

fn describe_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "no response".to_string(),
    }
}
