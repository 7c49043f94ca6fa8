use reqwest::StatusCode;
use serde_json::Value;

use crate::session::SessionStoreError;
use crate::uploads::UploadError;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Request failed with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Request failed {0}")]
    Transport(#[from] reqwest_middleware::Error),

    #[error("Failed to read response {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read file {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Session(#[from] SessionStoreError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl ApiError {
    /// Builds the error for a non-success response from its status and raw body
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }
        ApiError::Status {
            status,
            message: backend_message(body),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(reqwest_middleware::Error::Reqwest(err)) | ApiError::Http(err) => {
                err.status()
            }
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Text shown to the admin: the backend message when there is one, `fallback` otherwise
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Validation(errors) => errors.to_string(),
            ApiError::Upload(err) => err.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Backend errors carry `message` either as a string or as a list of strings
fn backend_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("message")? {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::Array(messages) => messages
            .iter()
            .find_map(|message| message.as_str())
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod errors_tests {
    use super::*;

    #[test]
    fn unauthorized_status_has_own_variant() {
        let error = ApiError::from_status(StatusCode::UNAUTHORIZED, b"{\"message\":\"expired\"}");
        assert!(matches!(error, ApiError::Unauthorized));
        assert!(error.is_unauthorized());
    }

    #[test]
    fn backend_message_is_preferred_over_fallback() {
        let error = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            br#"{"message":"Slug already taken","statusCode":400}"#,
        );
        assert_eq!(error.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(error.user_message("fallback"), "Slug already taken");
    }

    #[test]
    fn first_message_of_a_list_is_used() {
        let error = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            br#"{"message":["title should not be empty","price must be positive"]}"#,
        );
        assert_eq!(error.user_message("fallback"), "title should not be empty");
    }

    #[test]
    fn fallback_when_body_has_no_message() {
        let bodies: [&[u8]; 4] = [
            b"",
            b"<html>oops</html>",
            br#"{"error":"x"}"#,
            br#"{"message":""}"#,
        ];
        for body in bodies {
            let error = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, body);
            assert_eq!(
                error.user_message("An unexpected error occurred"),
                "An unexpected error occurred"
            );
        }
    }
}
