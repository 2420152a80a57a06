//! Error types raised by the Reddit client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::platform::PlatformError;

/// Convenient result alias returning [`RedditError`] failures.
pub type RedditResult<T> = Result<T, RedditError>;

/// Failures that can occur while talking to Reddit.
#[derive(Debug, Error)]
pub enum RedditError {
    /// Required environment variable is missing.
    #[error("missing Reddit environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build Reddit client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The access token request could not be completed.
    #[error("failed to obtain Reddit access token")]
    Authenticate {
        #[source]
        source: reqwest::Error,
    },
    /// Reddit refused the bot credentials.
    #[error("Reddit rejected the bot credentials with status {status}")]
    AuthenticateStatus { status: StatusCode },
    /// A request to an API endpoint could not be sent.
    #[error("failed to send Reddit request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Reddit returned an unexpected status code.
    #[error("unexpected Reddit response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed.
    #[error("failed to decode Reddit response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Reddit accepted the request but reported errors in the body.
    #[error("Reddit reported errors for `{path}`: {errors}")]
    Api { path: String, errors: String },
}

impl From<RedditError> for PlatformError {
    fn from(err: RedditError) -> Self {
        match err {
            RedditError::AuthenticateStatus { .. }
            | RedditError::RequestStatus { .. }
            | RedditError::Api { .. } => PlatformError::rejected(err.to_string()),
            other => PlatformError::transport(other.to_string(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reddit_answers_map_to_rejected() {
        let err = PlatformError::from(RedditError::Api {
            path: "/api/comment".into(),
            errors: "RATELIMIT".into(),
        });
        assert!(err.is_rejected());
        assert!(err.to_string().contains("RATELIMIT"));

        let err = PlatformError::from(RedditError::RequestStatus {
            path: "/message/unread".into(),
            status: StatusCode::FORBIDDEN,
        });
        assert!(err.is_rejected());
    }

    #[test]
    fn local_failures_map_to_transport() {
        let err = PlatformError::from(RedditError::MissingEnvVar {
            var: "REDDIT_PASSWORD",
        });
        assert!(!err.is_rejected());
        assert!(std::error::Error::source(&err).is_some());
    }
}
