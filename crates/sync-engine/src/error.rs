//! Error Types
//!
//! Transport and rejection failures from the backend, plus client-side
//! validation failures raised before any request is made.

use serde::Deserialize;
use thiserror::Error;

/// Common result type for backend calls
pub type ApiResult<T> = Result<T, ClientError>;

/// Failures a `ResourceClient` call can end with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never reached the server or no usable response came back
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status
    #[error("request rejected ({status}): {body}")]
    RequestRejected { status: u16, body: String },
}

impl ClientError {
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        ClientError::RequestRejected {
            status,
            body: body.into(),
        }
    }

    /// Rejection for an operation the resource kind does not expose
    pub fn unsupported(operation: &str) -> Self {
        ClientError::rejected(405, format!("{operation} is not supported for this resource"))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Network(_) => None,
            ClientError::RequestRejected { status, .. } => Some(*status),
        }
    }

    /// Short message suitable for a notice banner
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => "Could not reach the server. Please try again.".to_string(),
            ClientError::RequestRejected { status, body } => match detail_from_body(body) {
                Some(detail) => detail,
                None if *status == 404 => "This item no longer exists.".to_string(),
                None => format!("The server rejected the request ({status})."),
            },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Validation(Vec<ValidationDetail>),
}

#[derive(Deserialize)]
struct ValidationDetail {
    msg: String,
    #[serde(default)]
    loc: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

/// Extract a readable message from a FastAPI-style `{"detail": ...}` body
fn detail_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Detail::Message(msg) => Some(msg),
        Detail::Validation(entries) => {
            let parts: Vec<String> = entries
                .into_iter()
                .map(|entry| match entry.loc.last().and_then(|v| v.as_str()) {
                    Some(field) => format!("{field}: {}", entry.msg),
                    None => entry.msg,
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
    }
}

/// Field checks mirroring the backend's request validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Failures of a non-optimistic create
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl CreateError {
    pub fn user_message(&self) -> String {
        match self {
            CreateError::Invalid(err) => err.to_string(),
            CreateError::Client(err) => err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message() {
        let err = ClientError::rejected(404, r#"{"detail":"Note not found"}"#);
        assert_eq!(err.user_message(), "Note not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_validation_detail() {
        let body = r#"{"detail":[{"loc":["body","title"],"msg":"String should have at least 1 character","type":"string_too_short"}]}"#;
        let err = ClientError::rejected(422, body);
        assert_eq!(err.user_message(), "title: String should have at least 1 character");
    }

    #[test]
    fn test_plain_body_falls_back_to_status() {
        let err = ClientError::rejected(500, "Internal Server Error");
        assert_eq!(err.user_message(), "The server rejected the request (500).");
    }

    #[test]
    fn test_network_error_message() {
        let err = ClientError::Network("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert!(err.user_message().contains("reach the server"));
    }

    #[test]
    fn test_unsupported_is_405() {
        assert_eq!(ClientError::unsupported("search").status(), Some(405));
    }

    #[test]
    fn test_create_error_messages() {
        let err: CreateError = ValidationError::Empty { field: "title" }.into();
        assert_eq!(err.user_message(), "title must not be empty");

        let err: CreateError = ClientError::rejected(422, r#"{"detail":"Tag already exists"}"#).into();
        assert_eq!(err.user_message(), "Tag already exists");
    }
}
