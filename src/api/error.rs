use serde_json::Value;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Everything that can go wrong between calling an endpoint and holding its typed result.
///
/// The `Display` text of each variant is what a user should see. For `Http` it is exactly the
/// message the backend put in its error body, or `Failed with status: <code>` when there was none.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// There is no bearer token; the request was not sent.
    #[error("Authentication required")]
    AuthRequired,

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The backend answered 2xx but refused the operation.
    #[error("{0}")]
    Rejected(String),

    /// A 2xx body that does not match the expected shape.
    #[error("Unable to parse the response from '{endpoint}': {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The request never produced a response (connection refused, timeout, bad TLS, ...).
    #[error("Request to '{endpoint}' failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The caller's input was rejected before anything was sent.
    #[error("{0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Builds the error for a non-2xx response from its status and raw body.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        ApiError::Http {
            status,
            message: error_message(status, body),
        }
    }

    /// The HTTP status, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_required(&self) -> bool {
        matches!(self, ApiError::AuthRequired) || self.status() == Some(401)
    }
}

/// Pulls a human-readable message out of an error body.
///
/// The backend uses `{"error": ...}` for its own errors, the JWT layer uses `{"msg": ...}`, and
/// some responses carry `{"message": ...}`. A non-string `error` (e.g. a Plaid error object) is
/// rendered as compact JSON.
fn error_message(status: u16, body: &str) -> String {
    let fallback = || format!("Failed with status: {status}");
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };
    for key in ["error", "msg", "message"] {
        match map.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return s.clone(),
            Some(Value::Null) | Some(Value::String(_)) | None => continue,
            Some(other) => return other.to_string(),
        }
    }
    fallback()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_field_is_used_verbatim() {
        let e = ApiError::from_response(401, r#"{"error":"Invalid Code"}"#);
        assert_eq!(e.to_string(), "Invalid Code");
        assert_eq!(e.status(), Some(401));
        assert!(e.is_auth_required());
    }

    #[test]
    fn test_jwt_msg_field() {
        let e = ApiError::from_response(401, r#"{"msg":"Token has expired"}"#);
        assert_eq!(e.to_string(), "Token has expired");
    }

    #[test]
    fn test_non_json_body_falls_back_to_status() {
        let e = ApiError::from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(e.to_string(), "Failed with status: 502");
    }

    #[test]
    fn test_empty_error_falls_back_to_status() {
        let e = ApiError::from_response(500, r#"{"error": ""}"#);
        assert_eq!(e.to_string(), "Failed with status: 500");
        let e = ApiError::from_response(500, r#"{"detail": "nope"}"#);
        assert_eq!(e.to_string(), "Failed with status: 500");
    }

    #[test]
    fn test_structured_error_is_rendered_as_json() {
        let e = ApiError::from_response(400, r#"{"error": {"error_code": "ITEM_LOGIN_REQUIRED"}}"#);
        assert_eq!(e.to_string(), r#"{"error_code":"ITEM_LOGIN_REQUIRED"}"#);
    }

    #[test]
    fn test_auth_required_display() {
        assert_eq!(ApiError::AuthRequired.to_string(), "Authentication required");
        assert!(ApiError::AuthRequired.is_auth_required());
    }
}
