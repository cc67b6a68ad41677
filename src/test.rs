//! Shared test utilities: a throwaway `FINN_HOME` and an in-process mock of the Finn backend.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::Transaction;
use crate::{model::Amount, Config};
use chrono::NaiveDate;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// A request as the mock backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, e.g. `/api/plaid/transactions?days=30`.
    pub uri: String,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(String, String), (u16, String)>,
    requests: Vec<RecordedRequest>,
}

/// An HTTP/1 server on `127.0.0.1` that answers each `(method, path)` with a canned status and
/// body, and records every request it receives. Unknown routes get a 404.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
    task: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(MockState::default()));
        let server_state = state.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = server_state.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(state.clone(), req));
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });
        Self { addr, state, task }
    }

    /// The value to use as the backend URL, including the `/api` prefix.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Registers the response for `method` and `path` (without query string).
    pub fn route(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.state.lock().unwrap().routes.insert(
            (method.to_uppercase(), path.to_string()),
            (status, body.into()),
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(
    state: Arc<Mutex<MockState>>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let uri = req
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| path.clone());
    let authorization = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = match req.into_body().collect().await {
        Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
        Err(_) => String::new(),
    };

    let (status, response_body) = {
        let mut state = state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: method.clone(),
            uri,
            authorization,
            body,
        });
        state
            .routes
            .get(&(method, path))
            .cloned()
            .unwrap_or_else(|| (404, r#"{"error": "Not Found"}"#.to_string()))
    };

    let mut response = Response::new(Full::new(Bytes::from(response_body)));
    *response.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    Ok(response)
}

/// Test environment that sets up a finn home directory pointing at a `MockBackend`.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
    backend: MockBackend,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let backend = MockBackend::start().await;
        let root = temp_dir.path().join("finn");
        let config = Config::create(&root, Some(&backend.base_url()))
            .await
            .unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
            backend,
        }
    }

    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn backend(&self) -> &MockBackend {
        &self.backend
    }

    /// Logs a user in with a random token and returns that token.
    pub async fn sign_in(&self) -> String {
        let token = Uuid::new_v4().to_string().replace('-', "");
        let mut session = self.config.open_session().await.unwrap();
        session
            .login(&token, "+15551234567", "Ada", "Lovelace")
            .await
            .unwrap();
        token
    }
}

/// Shorthand for building an `Amount` from a decimal string.
pub fn amount(s: &str) -> Amount {
    Amount::new(Decimal::from_str(s).unwrap())
}

/// Shorthand for building a `NaiveDate`.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A transaction with a single category.
pub fn tx(id: &str, on: NaiveDate, amt: &str, category: &str) -> Transaction {
    let category = if category.is_empty() {
        Vec::new()
    } else {
        vec![category.to_string()]
    };
    Transaction::new(id, on, format!("Transaction {id}"), amount(amt), category)
}
