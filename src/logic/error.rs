//! Console Error Kinds
//!
//! Every failure the operator can see falls into one of four kinds.
//! Remote failures never corrupt local state: the Threat Store leaves its
//! collection as it was before the failed call.

use thiserror::Error;

use super::remote::ApiError;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConsoleError {
    /// Bad credentials or an expired/missing token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Local-only rejection, no remote call was issued
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A load/create/update/delete against the remote authority failed
    #[error("Sync failed: {0}")]
    Sync(String),

    /// Detection process or video feed failure
    #[error("Stream error: {0}")]
    Stream(String),
}

impl ConsoleError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short label used when surfacing notices
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "auth",
            Self::Validation(_) => "validation",
            Self::Sync(_) => "sync",
            Self::Stream(_) => "stream",
        }
    }

    /// Map a transport error on a login/register path
    pub fn from_auth(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(msg) => Self::Authentication(msg),
            ApiError::Server { message, .. } => Self::Authentication(message),
            other => Self::Authentication(other.to_string()),
        }
    }

    /// Map a transport error on a detection path
    pub fn from_stream(err: ApiError) -> Self {
        Self::Stream(err.to_string())
    }
}

impl From<ApiError> for ConsoleError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotAuthenticated => Self::Authentication(err.to_string()),
            other => Self::Sync(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_become_sync_errors() {
        let err: ConsoleError = ApiError::Network("connection refused".to_string()).into();
        assert_eq!(err.kind(), "sync");
        assert!(err.to_string().contains("connection refused"));

        let err: ConsoleError = ApiError::NotAuthenticated.into();
        assert_eq!(err.kind(), "auth");
    }

    #[test]
    fn test_auth_path_keeps_server_message() {
        let err = ConsoleError::from_auth(ApiError::Unauthorized("Invalid credentials".to_string()));
        assert_eq!(err, ConsoleError::Authentication("Invalid credentials".to_string()));

        let err = ConsoleError::from_auth(ApiError::Server {
            status: 400,
            message: "Username already exists".to_string(),
        });
        assert_eq!(err, ConsoleError::Authentication("Username already exists".to_string()));
    }
}
