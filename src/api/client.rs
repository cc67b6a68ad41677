use crate::api::error::{ApiError, ApiResult};
use crate::api::{
    Auth, Endpoint, ACCOUNT_STATUS, CREATE_LINK_TOKEN, EXCHANGE_PUBLIC_TOKEN,
    EXCHANGE_PUBLIC_TOKEN_SIGNUP, GET_SETTINGS, HEALTH, LIST_ACCOUNTS, LIST_TRANSACTIONS,
    SEND_CHAT_MESSAGE, SEND_VERIFICATION, UPDATE_SETTINGS, VERIFY_CODE,
};
use crate::model::auth::{
    normalize_phone, SendVerificationRequest, VerifyCodeRequest, VERIFICATION_CODE_LEN,
};
use crate::model::plaid::{ExchangeRequest, SignupExchangeRequest};
use crate::model::{
    AccountStatus, AccountsResponse, Ack, ChatRequest, ChatResponse, ExchangeResponse,
    LinkTokenResponse, SettingsResponse, SettingsUpdate, SettingsUpdateResponse,
    SignupExchangeResponse, TransactionQuery, TransactionsResponse, VerifyResponse,
};
use crate::Result;
use anyhow::Context;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

/// The message shown for every failed verification attempt, whatever the backend said.
const INVALID_CODE: &str = "Invalid Code";

/// A client for the Finn backend.
///
/// Each operation takes its parameters followed by the bearer token (when the endpoint needs one)
/// and returns the parsed response. Nothing is retried; a caller that wants to try again simply
/// calls the operation again. Requests are independent of one another, so concurrent calls on a
/// shared client are fine.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

/// A response whose body has been read but not yet interpreted.
struct RawResponse {
    status: u16,
    body: String,
}

impl ApiClient {
    /// Creates a client for the backend at `base_url`, e.g. `http://localhost:5001/api`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Like `new`, with an optional overall timeout applied to every request.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Unable to build the HTTP client")?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET plaid/accounts`
    pub async fn list_accounts(&self, token: Option<&str>) -> ApiResult<AccountsResponse> {
        let request = self.request(&LIST_ACCOUNTS, token)?;
        self.call(&LIST_ACCOUNTS, request).await
    }

    /// `GET plaid/transactions?days=&stock_only=&include_custom=`
    pub async fn list_transactions(
        &self,
        query: TransactionQuery,
        token: Option<&str>,
    ) -> ApiResult<TransactionsResponse> {
        let request = self
            .request(&LIST_TRANSACTIONS, token)?
            .query(&query.to_pairs());
        self.call(&LIST_TRANSACTIONS, request).await
    }

    /// `POST plaid/create-link-token`
    pub async fn create_link_token(&self, token: Option<&str>) -> ApiResult<LinkTokenResponse> {
        let request = self.request(&CREATE_LINK_TOKEN, token)?;
        self.call(&CREATE_LINK_TOKEN, request).await
    }

    /// `POST plaid/exchange-public-token` for a signed-in user.
    pub async fn exchange_public_token(
        &self,
        public_token: &str,
        token: Option<&str>,
    ) -> ApiResult<ExchangeResponse> {
        let public_token = non_empty(public_token, "Public token is required")?;
        let request = self
            .request(&EXCHANGE_PUBLIC_TOKEN, token)?
            .json(&ExchangeRequest {
                public_token: public_token.to_string(),
            });
        self.call(&EXCHANGE_PUBLIC_TOKEN, request).await
    }

    /// `POST plaid/signup-transactions`: links an account before the user has a bearer token. The
    /// phone number identifies the user being signed up.
    pub async fn exchange_public_token_signup(
        &self,
        public_token: &str,
        phone_number: &str,
    ) -> ApiResult<SignupExchangeResponse> {
        let public_token = non_empty(public_token, "Public token is required")?;
        let phone_number = non_empty(phone_number, "Phone number is required")?;
        let request = self
            .request(&EXCHANGE_PUBLIC_TOKEN_SIGNUP, None)?
            .json(&SignupExchangeRequest {
                public_token: public_token.to_string(),
                phone_number: normalize_phone(phone_number),
            });
        self.call(&EXCHANGE_PUBLIC_TOKEN_SIGNUP, request).await
    }

    /// `GET plaid/account-status`
    pub async fn account_status(&self, token: Option<&str>) -> ApiResult<AccountStatus> {
        let request = self.request(&ACCOUNT_STATUS, token)?;
        self.call(&ACCOUNT_STATUS, request).await
    }

    /// `POST auth/send-verification`: asks the backend to text a one-time code to `phone_number`.
    pub async fn send_verification_code(&self, phone_number: &str) -> ApiResult<Ack> {
        let phone_number = non_empty(phone_number, "Phone number is required")?;
        let request = self
            .request(&SEND_VERIFICATION, None)?
            .json(&SendVerificationRequest {
                phone_number: normalize_phone(phone_number),
            });
        self.call(&SEND_VERIFICATION, request).await
    }

    /// `POST auth/verify-code`
    ///
    /// Any refusal, whether a non-2xx status or a 2xx body without `authenticated: true` and an
    /// access token, is reported with the message `Invalid Code`.
    pub async fn verify_code(&self, phone_number: &str, code: &str) -> ApiResult<VerifyResponse> {
        let phone_number = non_empty(phone_number, "Phone number is required")?;
        let code = code.trim();
        if code.chars().count() != VERIFICATION_CODE_LEN {
            return Err(ApiError::InvalidInput(format!(
                "Please enter a valid {VERIFICATION_CODE_LEN}-digit verification code"
            )));
        }
        let request = self.request(&VERIFY_CODE, None)?.json(&VerifyCodeRequest {
            phone_number: normalize_phone(phone_number),
            code: code.to_string(),
        });
        let raw = self.send(&VERIFY_CODE, request).await?;
        if !is_success(raw.status) {
            debug!(
                "Verification refused with status {}: {}",
                raw.status, raw.body
            );
            return Err(ApiError::Http {
                status: raw.status,
                message: INVALID_CODE.to_string(),
            });
        }
        let verified: VerifyResponse = decode(&VERIFY_CODE, &raw)?;
        if verified.access_token().is_none() {
            return Err(ApiError::Rejected(INVALID_CODE.to_string()));
        }
        Ok(verified)
    }

    /// `GET settings/get`
    ///
    /// A 404 means the user has never saved settings; the documented defaults are returned instead
    /// of an error.
    pub async fn get_settings(&self, token: Option<&str>) -> ApiResult<SettingsResponse> {
        let request = self.request(&GET_SETTINGS, token)?;
        let raw = self.send(&GET_SETTINGS, request).await?;
        if raw.status == 404 {
            warn!("User settings not found, using defaults");
            return Ok(SettingsResponse::defaults());
        }
        decode(&GET_SETTINGS, &raw)
    }

    /// `POST settings/update` with only the fields set in `update`.
    pub async fn update_settings(
        &self,
        update: &SettingsUpdate,
        token: Option<&str>,
    ) -> ApiResult<SettingsUpdateResponse> {
        if update.is_empty() {
            return Err(ApiError::InvalidInput("No settings provided".to_string()));
        }
        let request = self.request(&UPDATE_SETTINGS, token)?.json(update);
        self.call(&UPDATE_SETTINGS, request).await
    }

    /// `POST chatbot/chat`
    pub async fn send_chat_message(
        &self,
        message: &str,
        token: Option<&str>,
    ) -> ApiResult<ChatResponse> {
        let message = non_empty(message, "Message is required")?;
        let request = self.request(&SEND_CHAT_MESSAGE, token)?.json(&ChatRequest {
            message: message.to_string(),
        });
        self.call(&SEND_CHAT_MESSAGE, request).await
    }

    /// `GET health`
    pub async fn health(&self) -> ApiResult<Ack> {
        let request = self.request(&HEALTH, None)?;
        self.call(&HEALTH, request).await
    }

    /// Starts a request for `endpoint`. Endpoints that need a bearer token fail here, before
    /// anything is sent, when `token` is absent or blank.
    fn request(&self, endpoint: &Endpoint, token: Option<&str>) -> ApiResult<RequestBuilder> {
        let url = self.base.join(endpoint.path).map_err(|e| {
            ApiError::InvalidInput(format!("Invalid endpoint path '{}': {e}", endpoint.path))
        })?;
        let builder = self.http.request(endpoint.method.clone(), url);
        match endpoint.auth {
            Auth::None => Ok(builder),
            Auth::Bearer => {
                let token = token
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or(ApiError::AuthRequired)?;
                trace!("Using token: {}", redact(token));
                Ok(builder.bearer_auth(token))
            }
        }
    }

    async fn call<T>(&self, endpoint: &Endpoint, request: RequestBuilder) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let raw = self.send(endpoint, request).await?;
        decode(endpoint, &raw)
    }

    async fn send(&self, endpoint: &Endpoint, request: RequestBuilder) -> ApiResult<RawResponse> {
        debug!("{} {}", endpoint.method, endpoint.path);
        let transport = |source| ApiError::Transport {
            endpoint: endpoint.path,
            source,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        debug!("{} {} -> {status}", endpoint.method, endpoint.path);
        Ok(RawResponse { status, body })
    }
}

/// Interprets a raw response: non-2xx becomes `ApiError::Http`, 2xx is parsed into `T`.
fn decode<T>(endpoint: &Endpoint, raw: &RawResponse) -> ApiResult<T>
where
    T: DeserializeOwned,
{
    if !is_success(raw.status) {
        let err = ApiError::from_response(raw.status, &raw.body);
        warn!("{} {} failed: {err}", endpoint.method, endpoint.path);
        return Err(err);
    }
    serde_json::from_str(&raw.body).map_err(|source| ApiError::Parse {
        endpoint: endpoint.path,
        source,
    })
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn non_empty<'a>(value: &'a str, message: &str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(message.to_string()));
    }
    Ok(trimmed)
}

/// Only the first few characters of a token ever reach the logs.
fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(10).collect();
    format!("{prefix}...")
}

/// Parses the base URL and makes sure it ends with `/` so that endpoint paths are joined beneath it
/// rather than replacing its last segment.
fn parse_base_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .with_context(|| format!("Invalid backend URL '{base_url}'"))?;
    anyhow::ensure!(
        matches!(url.scheme(), "http" | "https"),
        "The backend URL must be http or https, got '{base_url}'"
    );
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Settings;
    use crate::test::MockBackend;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("http://localhost:5001/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5001/api/");
        assert_eq!(
            url.join("plaid/accounts").unwrap().as_str(),
            "http://localhost:5001/api/plaid/accounts"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("ftp://example.com/api").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGciOi...");
    }

    #[tokio::test]
    async fn test_list_accounts_sends_bearer_token() {
        let backend = MockBackend::start().await;
        backend.route(
            "GET",
            "/api/plaid/accounts",
            200,
            r#"{"accounts": [{"account_id": "a1", "name": "Checking", "balances": {"current": 100.5}}]}"#,
        );
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let accounts = client.list_accounts(Some("tok123")).await.unwrap();

        assert_eq!(accounts.accounts.len(), 1);
        assert_eq!(accounts.accounts[0].account_id, "a1");
        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer tok123"));
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits() {
        let backend = MockBackend::start().await;
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let err = client.list_accounts(None).await.unwrap_err();
        assert!(matches!(err, ApiError::AuthRequired));
        let err = client.account_status(Some("  ")).await.unwrap_err();
        assert!(matches!(err, ApiError::AuthRequired));

        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let backend = MockBackend::start().await;
        backend.route(
            "POST",
            "/api/chatbot/chat",
            400,
            r#"{"error":"Invalid Code"}"#,
        );
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let err = client.send_chat_message("hi", Some("t")).await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid Code");
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_non_json_error_falls_back_to_status() {
        let backend = MockBackend::start().await;
        backend.route("GET", "/api/plaid/account-status", 503, "Service Unavailable");
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let err = client.account_status(Some("t")).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed with status: 503");
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_a_parse_error() {
        let backend = MockBackend::start().await;
        backend.route("GET", "/api/plaid/account-status", 200, "{not json");
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let err = client.account_status(Some("t")).await.unwrap_err();

        assert!(matches!(err, ApiError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_list_transactions_query_string() {
        let backend = MockBackend::start().await;
        backend.route("GET", "/api/plaid/transactions", 200, r#"{"transactions": []}"#);
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let response = client
            .list_transactions(TransactionQuery::days(90), Some("t"))
            .await
            .unwrap();

        assert!(response.transactions.is_empty());
        let requests = backend.requests();
        assert_eq!(
            requests[0].uri,
            "/api/plaid/transactions?days=90&stock_only=false&include_custom=true"
        );
    }

    #[tokio::test]
    async fn test_verify_code_non_2xx_is_invalid_code() {
        let backend = MockBackend::start().await;
        backend.route(
            "POST",
            "/api/auth/verify-code",
            401,
            r#"{"message": "Invalid verification code", "authenticated": false, "error": "pending"}"#,
        );
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let err = client.verify_code("5551234567", "123456").await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid Code");
        let body: serde_json::Value =
            serde_json::from_str(&backend.requests()[0].body).unwrap();
        assert_eq!(body["phone_number"], "+15551234567");
        assert_eq!(body["code"], "123456");
    }

    #[tokio::test]
    async fn test_verify_code_success_without_token_is_rejected() {
        let backend = MockBackend::start().await;
        backend.route(
            "POST",
            "/api/auth/verify-code",
            200,
            r#"{"authenticated": false}"#,
        );
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let err = client.verify_code("+15551234567", "123456").await.unwrap_err();

        assert!(matches!(err, ApiError::Rejected(_)));
        assert_eq!(err.to_string(), "Invalid Code");
    }

    #[tokio::test]
    async fn test_verify_code_wrong_length_is_not_sent() {
        let backend = MockBackend::start().await;
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let err = client.verify_code("+15551234567", "123").await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_get_settings_404_returns_defaults() {
        let backend = MockBackend::start().await;
        backend.route(
            "GET",
            "/api/settings/get",
            404,
            r#"{"error": "User settings not found"}"#,
        );
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let settings = client.get_settings(Some("t")).await.unwrap();

        assert_eq!(settings.settings, Settings::default());
        assert_eq!(settings.settings.model, "gpt4");
    }

    #[tokio::test]
    async fn test_get_settings_500_is_an_error() {
        let backend = MockBackend::start().await;
        backend.route("GET", "/api/settings/get", 500, r#"{"error": "boom"}"#);
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let err = client.get_settings(Some("t")).await.unwrap_err();

        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_signup_exchange_needs_no_token() {
        let backend = MockBackend::start().await;
        backend.route(
            "POST",
            "/api/plaid/signup-transactions",
            200,
            r#"{"item_id": "item-1", "plaid_connected": true, "transactions": [], "accounts": []}"#,
        );
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let response = client
            .exchange_public_token_signup("public-sandbox-1", "555 123 4567")
            .await
            .unwrap();

        assert_eq!(response.exchange.item_id.as_deref(), Some("item-1"));
        let request = &backend.requests()[0];
        assert_eq!(request.authorization, None);
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["public_token"], "public-sandbox-1");
        assert_eq!(body["phone_number"], "+15551234567");
    }

    #[tokio::test]
    async fn test_update_settings_rejects_empty_update() {
        let backend = MockBackend::start().await;
        let client = ApiClient::new(&backend.base_url()).unwrap();

        let err = client
            .update_settings(&SettingsUpdate::default(), Some("t"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = ApiClient::new("http://127.0.0.1:1/api").unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }
}
