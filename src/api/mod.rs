//! Typed access to the Finn backend.
//!
//! Every endpoint the front-end uses is listed once in the table below. `ApiClient` looks up the
//! method, path and whether a bearer token is required from here, so auth-header injection and
//! error handling are the same for all of them.

mod client;
mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};

use reqwest::Method;

/// The backend origin used when neither the config file nor the environment provides one.
pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";

/// Whether an endpoint needs `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Bearer,
    None,
}

/// One row of the endpoint table.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    pub(crate) method: Method,
    pub(crate) path: &'static str,
    pub(crate) auth: Auth,
}

impl Endpoint {
    const fn new(method: Method, path: &'static str, auth: Auth) -> Self {
        Self { method, path, auth }
    }
}

pub(crate) const LIST_ACCOUNTS: Endpoint =
    Endpoint::new(Method::GET, "plaid/accounts", Auth::Bearer);
pub(crate) const LIST_TRANSACTIONS: Endpoint =
    Endpoint::new(Method::GET, "plaid/transactions", Auth::Bearer);
pub(crate) const CREATE_LINK_TOKEN: Endpoint =
    Endpoint::new(Method::POST, "plaid/create-link-token", Auth::Bearer);
pub(crate) const EXCHANGE_PUBLIC_TOKEN: Endpoint =
    Endpoint::new(Method::POST, "plaid/exchange-public-token", Auth::Bearer);
pub(crate) const EXCHANGE_PUBLIC_TOKEN_SIGNUP: Endpoint =
    Endpoint::new(Method::POST, "plaid/signup-transactions", Auth::None);
pub(crate) const ACCOUNT_STATUS: Endpoint =
    Endpoint::new(Method::GET, "plaid/account-status", Auth::Bearer);
pub(crate) const SEND_VERIFICATION: Endpoint =
    Endpoint::new(Method::POST, "auth/send-verification", Auth::None);
pub(crate) const VERIFY_CODE: Endpoint =
    Endpoint::new(Method::POST, "auth/verify-code", Auth::None);
pub(crate) const GET_SETTINGS: Endpoint = Endpoint::new(Method::GET, "settings/get", Auth::Bearer);
pub(crate) const UPDATE_SETTINGS: Endpoint =
    Endpoint::new(Method::POST, "settings/update", Auth::Bearer);
pub(crate) const SEND_CHAT_MESSAGE: Endpoint =
    Endpoint::new(Method::POST, "chatbot/chat", Auth::Bearer);
pub(crate) const HEALTH: Endpoint = Endpoint::new(Method::GET, "health", Auth::None);
