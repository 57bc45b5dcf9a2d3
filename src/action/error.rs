//! Error types: producer failures and construction misuse.

use std::fmt;

use serde_json::Value;

/// Message used when a failure carries nothing readable.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Failure reported by a producer.
///
/// Shaped after an HTTP client error: an optional status code, an optional
/// top-level message and an optional decoded response body. Actions never
/// surface this type to callers directly; they record [`message`](Self::message).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchError {
    pub status: Option<u16>,
    pub message: Option<String>,
    pub body: Option<Value>,
}

impl FetchError {
    /// Failure with only a top-level message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Failure carrying a status and a decoded response body.
    pub fn response(status: u16, body: Value) -> Self {
        Self {
            status: Some(status),
            body: Some(body),
            ..Self::default()
        }
    }

    /// Failure with nothing to report.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Set the top-level message (builder).
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Normalized, user-facing message.
    ///
    /// Resolution order:
    /// 1. the `message` string inside the response body,
    /// 2. the top-level message,
    /// 3. [`UNKNOWN_ERROR`].
    ///
    /// Empty strings are skipped.
    pub fn message(&self) -> String {
        self.body_message()
            .or_else(|| self.message.as_deref().filter(|m| !m.is_empty()))
            .unwrap_or(UNKNOWN_ERROR)
            .to_owned()
    }

    fn body_message(&self) -> Option<&str> {
        self.body
            .as_ref()?
            .get("message")?
            .as_str()
            .filter(|m| !m.is_empty())
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.message()),
            None => f.write_str(&self.message()),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Invalid action configuration, reported at construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("action `{name}` is tracked but no ActivityTracker was provided")]
    MissingTracker { name: String },
    #[error("action `{name}` has a zero debounce window")]
    InvalidDebounce { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_message_wins() {
        let err = FetchError::response(422, json!({ "message": "email taken" }))
            .with_message("Http failure response");
        assert_eq!(err.message(), "email taken");
    }

    #[test]
    fn falls_back_to_top_level_message() {
        let err = FetchError::response(500, json!({ "detail": "nope" }))
            .with_message("Internal Server Error");
        assert_eq!(err.message(), "Internal Server Error");
    }

    #[test]
    fn non_string_body_message_is_ignored() {
        let err = FetchError::response(400, json!({ "message": 12 })).with_message("bad");
        assert_eq!(err.message(), "bad");
    }

    #[test]
    fn empty_strings_are_skipped() {
        let err = FetchError::response(400, json!({ "message": "" })).with_message("");
        assert_eq!(err.message(), UNKNOWN_ERROR);
    }

    #[test]
    fn unknown_uses_fallback() {
        assert_eq!(FetchError::unknown().message(), UNKNOWN_ERROR);
    }

    #[test]
    fn display_includes_status() {
        let err = FetchError::response(404, json!({ "message": "no such user" }));
        assert_eq!(err.to_string(), "no such user (status 404)");
        assert_eq!(FetchError::from("offline").to_string(), "offline");
    }

    #[test]
    fn json_errors_convert() {
        let err: FetchError = serde_json::from_str::<Value>("{").unwrap_err().into();
        assert!(err.message().contains("EOF"));
    }

    #[test]
    fn action_error_messages() {
        let err = ActionError::MissingTracker { name: "load".into() };
        assert_eq!(
            err.to_string(),
            "action `load` is tracked but no ActivityTracker was provided"
        );
    }
}
