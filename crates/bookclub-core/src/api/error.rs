use serde_json::Value;
use thiserror::Error;

/// Message shown whenever the backend cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str =
    "Could not connect to the server. Check that the backend is running.";

/// Message for authenticated calls attempted without a stored token.
pub const MISSING_TOKEN_MESSAGE: &str = "Authorization token not found";

/// Maximum length for error messages lifted out of response bodies
const MAX_ERROR_MESSAGE_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (connection refused, DNS, TLS).
    #[error("{}", UNREACHABLE_MESSAGE)]
    Network { detail: String },

    #[error("{}", MISSING_TOKEN_MESSAGE)]
    MissingToken,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Token storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Build an HTTP error from a status code and the (possibly empty) body.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|data| extract_message(&data))
            .map(|m| truncate_message(&m))
            .unwrap_or_else(|| format!("Error {}", status));
        ApiError::Http { status, message }
    }

    pub fn storage(err: anyhow::Error) -> Self {
        ApiError::Storage(format!("{:#}", err))
    }

    pub fn network(detail: impl Into<String>) -> Self {
        ApiError::Network {
            detail: detail.into(),
        }
    }

    /// HTTP status when the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// User-facing message
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True when the caller must sign in before retrying.
    pub fn needs_sign_in(&self) -> bool {
        matches!(self, ApiError::MissingToken) || self.is_unauthorized()
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend reports `{"detail": "..."}` for handled errors and
/// `{"detail": [{"msg": "...", ...}]}` for request validation failures.
fn extract_message(data: &Value) -> Option<String> {
    match data.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(Value::Array(items)) => {
            if let Some(msg) = items
                .iter()
                .find_map(|item| item.get("msg").and_then(Value::as_str))
            {
                return Some(msg.to_string());
            }
        }
        _ => {}
    }
    data.get("message")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_MESSAGE_LENGTH {
        message.to_string()
    } else {
        let head: String = message.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_detail() {
        let err = ApiError::from_status(404, br#"{"detail": "Book not found"}"#);
        assert_eq!(err.message(), "Book not found");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_status_uses_first_validation_message() {
        let body = br#"{"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"}]}"#;
        let err = ApiError::from_status(422, body);
        assert_eq!(err.message(), "value is not a valid email address");
    }

    #[test]
    fn test_from_status_falls_back_to_message_field() {
        let err = ApiError::from_status(400, br#"{"message": "Already registered"}"#);
        assert_eq!(err.message(), "Already registered");
    }

    #[test]
    fn test_from_status_generic_fallback() {
        assert_eq!(ApiError::from_status(500, b"").message(), "Error 500");
        assert_eq!(ApiError::from_status(502, b"<html>Bad gateway</html>").message(), "Error 502");
        assert_eq!(ApiError::from_status(400, br#"{"detail": ""}"#).message(), "Error 400");
    }

    #[test]
    fn test_network_error_has_fixed_message_and_no_status() {
        let err = ApiError::network("tcp connect error: Connection refused (os error 111)");
        assert_eq!(err.message(), UNREACHABLE_MESSAGE);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_needs_sign_in() {
        assert!(ApiError::MissingToken.needs_sign_in());
        assert!(ApiError::from_status(401, b"").needs_sign_in());
        assert!(!ApiError::from_status(403, b"").needs_sign_in());
        assert!(!ApiError::network("dns").needs_sign_in());
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let long = "x".repeat(MAX_ERROR_MESSAGE_LENGTH + 20);
        let body = serde_json::json!({ "detail": long }).to_string();
        let err = ApiError::from_status(400, body.as_bytes());
        assert_eq!(err.message().chars().count(), MAX_ERROR_MESSAGE_LENGTH + 3);
    }
}
