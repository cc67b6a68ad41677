//! Command handlers for the finn CLI.
//!
//! Each subcommand is one of the app's views: it reads the session, calls the backend through
//! `ApiClient`, and returns an `Out` describing what happened.

mod auth;
mod chat;
mod dashboard;
mod init;
mod plaid;
mod settings;

use crate::api::ApiClient;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use auth::{login, logout, status, verify, SignedIn, Status};
pub use chat::chat;
pub use dashboard::{dashboard, Dashboard};
pub use init::init;
pub use plaid::{accounts, link_exchange, link_status, link_token, transactions, Linked};
pub use settings::{settings_get, settings_set};

/// The output type for a command: a message for the user and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// The auth gate for protected commands. Returns a client and the bearer token, or
/// `ApiError::AuthRequired` when no one is signed in. Nothing is sent to the backend either way.
async fn signed_in(config: &Config) -> Result<(ApiClient, String)> {
    let session = config.open_session().await?;
    let token = session.require_token()?.to_string();
    Ok((config.api_client()?, token))
}
