use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - the session credential was rejected")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data around
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Pull the human-readable message out of the server's error envelope
    /// (`{"timestamp", "message", "status"}`), falling back to the raw
    /// body.
    fn body_message(body: &str) -> String {
        #[derive(serde::Deserialize)]
        struct Envelope {
            message: Option<String>,
        }

        match serde_json::from_str::<Envelope>(body) {
            Ok(Envelope {
                message: Some(message),
            }) if !message.is_empty() => message,
            _ => Self::truncate_body(body),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 | 422 => ApiError::Validation(Self::body_message(body)),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(Self::body_message(body)),
            404 => ApiError::NotFound(Self::body_message(body)),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(Self::body_message(body)),
            _ => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }

    /// True when the server explicitly rejected the presented credential.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
