//! The login view: requesting a code, verifying it, signing out and showing who is signed in.

use crate::commands::Out;
use crate::model::auth::normalize_phone;
use crate::session::AuthState;
use crate::{Config, Result};
use serde::Serialize;
use tracing::{debug, warn};

/// Asks the backend to text a verification code to `phone`.
pub async fn login(config: &Config, phone: &str) -> Result<Out<()>> {
    let client = config.api_client()?;
    let ack = client.send_verification_code(phone).await?;
    debug!("send-verification: {ack:?}");
    Ok(format!(
        "Verification code sent to {}. Run 'finn verify --phone {} --code <code>' next",
        normalize_phone(phone),
        phone.trim()
    )
    .into())
}

/// The identity returned by a successful verification. The bearer token is never included.
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub phone_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub plaid_enabled: bool,
    pub next_step: Option<String>,
}

/// Verifies `code` for `phone` and, when the backend accepts it, persists the session.
///
/// # Errors
/// - `ApiError::InvalidInput` if `code` is not six characters long
/// - `ApiError::Http` or `ApiError::Rejected` with the message `Invalid Code` if the backend
///   refuses the code; the stored session is left as it was
pub async fn verify(config: &Config, phone: &str, code: &str) -> Result<Out<SignedIn>> {
    let client = config.api_client()?;
    let verified = client.verify_code(phone, code).await?;
    let token = verified
        .access_token()
        .ok_or_else(|| anyhow::anyhow!("The backend accepted the code but sent no token"))?;
    let phone_number = verified
        .phone_number
        .clone()
        .unwrap_or_else(|| normalize_phone(phone));

    let mut session = config.open_session().await?;
    session
        .login(
            token,
            &phone_number,
            verified.first_name.as_deref().unwrap_or_default(),
            verified.last_name.as_deref().unwrap_or_default(),
        )
        .await?;

    let signed_in = SignedIn {
        phone_number,
        first_name: verified.first_name.clone(),
        last_name: verified.last_name.clone(),
        plaid_enabled: verified.plaid_enabled,
        next_step: verified.next_step.clone(),
    };
    let who = session
        .session()
        .display_name()
        .unwrap_or_else(|| signed_in.phone_number.clone());
    let message = if signed_in.plaid_enabled {
        format!("Signed in as {who}")
    } else {
        format!("Signed in as {who}. No bank is linked yet, run 'finn link token' to start")
    };
    Ok(Out::new(message, signed_in))
}

/// Clears the stored session.
pub async fn logout(config: &Config) -> Result<Out<()>> {
    let mut session = config.open_session().await?;
    let was = session.state();
    session.logout().await?;
    Ok(match was {
        AuthState::Authenticated => "Signed out",
        _ => "Not signed in",
    }
    .into())
}

#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub state: AuthState,
    pub phone_number: Option<String>,
    pub name: Option<String>,
    pub api_url: String,
    /// Only set when the backend was pinged.
    pub backend_reachable: Option<bool>,
}

/// Reports the session state and, with `ping`, whether the backend answers its health check.
pub async fn status(config: &Config, ping: bool) -> Result<Out<Status>> {
    let session = config.open_session().await?;
    let backend_reachable = if ping {
        match config.api_client()?.health().await {
            Ok(_) => Some(true),
            Err(e) => {
                warn!("Backend health check failed: {e}");
                Some(false)
            }
        }
    } else {
        None
    };
    let status = Status {
        state: session.state(),
        phone_number: session.session().phone_number().map(str::to_string),
        name: session.session().display_name(),
        api_url: config.api_url().to_string(),
        backend_reachable,
    };

    let mut message = match (&status.name, &status.phone_number) {
        (Some(name), Some(phone)) if session.is_authenticated() => {
            format!("Signed in as {name} ({phone})")
        }
        (None, Some(phone)) if session.is_authenticated() => format!("Signed in as {phone}"),
        _ if session.is_authenticated() => "Signed in".to_string(),
        _ => "Not signed in, run 'finn login --phone <number>'".to_string(),
    };
    match status.backend_reachable {
        Some(true) => message.push_str(&format!("\nBackend {} is up", status.api_url)),
        Some(false) => message.push_str(&format!("\nBackend {} is unreachable", status.api_url)),
        None => {}
    }
    Ok(Out::new(message, status))
}
