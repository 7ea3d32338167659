use thiserror::Error;

use textileflow_core::DomainError;
use textileflow_invoicing::SettlementError;

use crate::config::ConfigError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a call through the client can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// A 401 could not be recovered by refreshing the access token.
    #[error("Session expired. Please sign in again.")]
    SessionExpired,

    /// No token pair is stored; the user has to log in first.
    #[error("not signed in")]
    NotAuthenticated,

    /// The response body did not match the expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Rejected locally before any request was sent.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backend answered, but the record it sent breaks a domain rule.
    #[error("malformed response: {0}")]
    Malformed(DomainError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error("token store error: {0}")]
    Token(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// Message shown to the user in a toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Domain(DomainError::Validation(msg)) => msg.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Did this fail before reaching the backend?
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::Domain(_) | ApiError::Settlement(_) | ApiError::Config(_)
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_backend_detail() {
        let err = ApiError::Status {
            status: 400,
            message: "Commission already fully settled.".into(),
        };
        assert_eq!(err.user_message(), "Commission already fully settled.");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_local());
    }

    #[test]
    fn local_validation_errors_are_flagged() {
        let err: ApiError = DomainError::validation("select a customer").into();
        assert!(err.is_local());
        assert_eq!(err.user_message(), "select a customer");

        let err: ApiError = SettlementError::NonPositiveAmount.into();
        assert!(err.is_local());
    }

    #[test]
    fn malformed_responses_are_not_local() {
        let err = ApiError::Malformed(DomainError::malformed("invoice 2: amount paid exceeds total"));
        assert!(!err.is_local());
        assert_eq!(
            err.user_message(),
            "malformed response: malformed record: invoice 2: amount paid exceeds total"
        );
    }
}
