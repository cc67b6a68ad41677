//! The client-side session: who is signed in, and with which bearer token.
//!
//! A `SessionStore` goes through three states. It starts `Unknown` while it reads the persisted
//! entries, becomes `Unauthenticated` or `Authenticated` once they are read, and afterwards only
//! moves between those two through `login` and `logout`. Whether the user is authenticated is
//! always derived from the token and never stored on its own.

mod gate;
mod storage;

pub use gate::Access;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};

use crate::Result;
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const TOKEN_KEY: &str = "finn_auth_token";
pub const PHONE_NUMBER_KEY: &str = "finn_phone_number";
pub const FIRST_NAME_KEY: &str = "finn_first_name";
pub const LAST_NAME_KEY: &str = "finn_last_name";

const ALL_KEYS: [&str; 4] = [TOKEN_KEY, PHONE_NUMBER_KEY, FIRST_NAME_KEY, LAST_NAME_KEY];

/// The persisted credential and identity fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: Option<String>,
    phone_number: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// "First Last", whichever parts are known.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name(), self.last_name()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// The persisted session has not been read yet.
    Unknown,
    Unauthenticated,
    Authenticated,
}

serde_plain::derive_display_from_serialize!(AuthState);

/// Owns the session and the storage it is persisted in. Callers read the session through this
/// type and change it only with `login` and `logout`; the storage is never exposed.
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
    session: Session,
    loading: bool,
}

impl<S> SessionStore<S>
where
    S: KeyValueStore,
{
    /// Creates a store in the `Unknown` state. Call `hydrate` before using it.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            session: Session::default(),
            loading: true,
        }
    }

    /// Creates a store and hydrates it from `storage`.
    pub async fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.hydrate().await;
        store
    }

    /// Reads the persisted session. An entry that is missing, unreadable or blank is treated as
    /// absent; hydration itself never fails. Only the first call has any effect.
    pub async fn hydrate(&mut self) {
        if !self.loading {
            debug!("Session already hydrated");
            return;
        }
        let session = Session {
            token: self.read(TOKEN_KEY).await,
            phone_number: self.read(PHONE_NUMBER_KEY).await,
            first_name: self.read(FIRST_NAME_KEY).await,
            last_name: self.read(LAST_NAME_KEY).await,
        };
        self.session = session;
        self.loading = false;
        debug!("Session hydrated, state is {}", self.state());
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(value) => value.as_deref().and_then(present),
            Err(e) => {
                debug!("Ignoring unreadable session entry '{key}': {e:#}");
                None
            }
        }
    }

    /// Persists all four fields, then replaces the in-memory session in one step. If persisting
    /// fails, the in-memory session is left as it was.
    pub async fn login(
        &mut self,
        token: &str,
        phone_number: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<()> {
        ensure!(!self.loading, "The session has not been loaded yet");
        ensure!(!token.trim().is_empty(), "Cannot log in with an empty token");
        self.storage
            .set_many(&[
                (TOKEN_KEY, token),
                (PHONE_NUMBER_KEY, phone_number),
                (FIRST_NAME_KEY, first_name),
                (LAST_NAME_KEY, last_name),
            ])
            .await?;
        self.session = Session {
            token: present(token),
            phone_number: present(phone_number),
            first_name: present(first_name),
            last_name: present(last_name),
        };
        info!("Logged in as {phone_number}");
        Ok(())
    }

    /// Clears the persisted fields and resets the in-memory session. The in-memory session is
    /// cleared even when the storage cannot be, in which case the storage error is returned.
    pub async fn logout(&mut self) -> Result<()> {
        ensure!(!self.loading, "The session has not been loaded yet");
        let cleared = self.storage.remove_many(&ALL_KEYS).await;
        self.session = Session::default();
        cleared?;
        info!("Logged out");
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn state(&self) -> AuthState {
        if self.loading {
            AuthState::Unknown
        } else if self.session.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }
}

// Blank values are stored but read back as absent.
fn present(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
