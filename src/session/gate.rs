//! The auth gate in front of protected views.

use crate::api::ApiError;
use crate::session::{KeyValueStore, Session, SessionStore};

/// What a protected view should do with the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    /// The session is still being read; decide nothing yet.
    Pending,
    /// No one is signed in; send the user to the login entry point.
    Redirect,
    Granted(&'a Session),
}

impl<S> SessionStore<S>
where
    S: KeyValueStore,
{
    pub fn access(&self) -> Access<'_> {
        if self.is_loading() {
            Access::Pending
        } else if self.is_authenticated() {
            Access::Granted(self.session())
        } else {
            Access::Redirect
        }
    }

    /// The bearer token for a protected call, or `AuthRequired` when there is none.
    pub fn require_token(&self) -> Result<&str, ApiError> {
        match self.access() {
            Access::Granted(session) => session.token().ok_or(ApiError::AuthRequired),
            Access::Pending | Access::Redirect => Err(ApiError::AuthRequired),
        }
    }
}
