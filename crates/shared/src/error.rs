use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a failed operation broke down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// No response reached the client.
    NetworkError,
    /// The store answered with a non-2xx status.
    ServerError,
    /// The request could not be built locally.
    RequestConfigError,
    /// Local pre-submission validation.
    ValidationError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::ServerError => "SERVER_ERROR",
            Self::RequestConfigError => "REQUEST_CONFIG_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload the remote store sends with 4xx/5xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<BTreeMap<String, serde_json::Value>>,
}

impl ErrorBody {
    /// Field details as display strings. Non-string detail values (the store
    /// sometimes sends numbers) are rendered as JSON.
    pub fn field_details(&self) -> Option<BTreeMap<String, String>> {
        let details = self.details.as_ref()?;
        Some(
            details
                .iter()
                .map(|(field, value)| {
                    let text = match value {
                        serde_json::Value::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    (field.clone(), text)
                })
                .collect(),
        )
    }
}

/// Normalized failure of any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {}", .message.as_deref().unwrap_or("no message"))]
pub struct Failure {
    pub kind: FailureKind,
    pub message: Option<String>,
    pub field_details: Option<BTreeMap<String, String>>,
    pub http_status: Option<u16>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            field_details: None,
            http_status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NetworkError, message)
    }

    pub fn request_config(message: impl Into<String>) -> Self {
        Self::new(FailureKind::RequestConfigError, message)
    }

    pub fn from_error_body(status: u16, body: ErrorBody) -> Self {
        Self {
            kind: FailureKind::ServerError,
            field_details: body.field_details(),
            message: body.message,
            http_status: Some(status),
        }
    }

    /// Field details, only when at least one field is named.
    pub fn non_empty_field_details(&self) -> Option<&BTreeMap<String, String>> {
        self.field_details
            .as_ref()
            .filter(|details| !details.is_empty())
    }

    /// The message to show, falling back to the failure kind.
    pub fn display_message(&self) -> String {
        self.message
            .clone()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| self.kind.to_string())
    }
}

/// Success/Failure result of one remote operation.
pub type OperationResult<T> = Result<T, Failure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_failure_keeps_message_details_and_status() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"error":"validation_error","message":"invalid","details":{"age":"out of range","user_id":7}}"#,
        )
        .expect("error body");
        let failure = Failure::from_error_body(400, body);

        assert_eq!(failure.kind, FailureKind::ServerError);
        assert_eq!(failure.message.as_deref(), Some("invalid"));
        assert_eq!(failure.http_status, Some(400));
        let details = failure.non_empty_field_details().expect("details");
        assert_eq!(details.get("age").map(String::as_str), Some("out of range"));
        assert_eq!(details.get("user_id").map(String::as_str), Some("7"));
    }

    #[test]
    fn empty_details_are_not_field_level() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"server_error","message":"boom","details":{}}"#)
                .expect("error body");
        let failure = Failure::from_error_body(500, body);
        assert!(failure.non_empty_field_details().is_none());
    }

    #[test]
    fn display_message_falls_back_to_kind() {
        let failure = Failure {
            kind: FailureKind::ServerError,
            message: None,
            field_details: None,
            http_status: Some(502),
        };
        assert_eq!(failure.display_message(), "SERVER_ERROR");
        assert_eq!(failure.to_string(), "SERVER_ERROR: no message");
    }
}
