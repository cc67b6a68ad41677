//! Payloads for the phone-number verification flow.

use serde::{Deserialize, Serialize};

/// Length of the one-time code sent by SMS.
pub const VERIFICATION_CODE_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendVerificationRequest {
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    pub phone_number: String,
    pub code: String,
}

/// A generic acknowledgement. The backend returns `{"message": ...}` plus endpoint-specific extras
/// which are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Response of `POST auth/verify-code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub tokens: Option<Tokens>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub plaid_enabled: bool,
    #[serde(default)]
    pub next_step: Option<String>,
}

impl VerifyResponse {
    /// The bearer token, only when the backend says the code was accepted.
    pub fn access_token(&self) -> Option<&str> {
        if !self.authenticated {
            return None;
        }
        self.tokens
            .as_ref()
            .map(|t| t.access_token.as_str())
            .filter(|t| !t.is_empty())
    }
}

/// Normalizes a phone number to E.164-ish form. Numbers already starting with `+` are kept as they
/// are; anything else is treated as a US number: its digits are prefixed with `+1`.
pub fn normalize_phone(phone: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        return phone.to_string();
    }
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("+1{digits}")
}
