//! Inbound request inspection.
//!
//! # Responsibilities
//! - Resolve which TripIt credential pair an inbound call acts for
//!
//! # Design Decisions
//! - A caller naming a user never falls back to the default session
//! - Store failures degrade to "not connected" and are logged

use axum::http::HeaderMap;

use crate::http::server::AppState;
use crate::oauth::CredentialPair;
use crate::store::load_user_credentials;

pub const X_USER_ID: &str = "x-user-id";

/// User id named by the caller, if any.
pub fn user_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(X_USER_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Credential pair for this request.
///
/// `X-User-Id` selects a stored pair; without it the configured default
/// session (if any) is used.
pub async fn resolve_credentials(state: &AppState, headers: &HeaderMap) -> Option<CredentialPair> {
    let Some(user_id) = user_id(headers) else {
        return state.default_session.clone();
    };

    match load_user_credentials(state.store.as_ref(), user_id).await {
        Ok(Some(pair)) => Some(pair),
        Ok(None) => {
            tracing::debug!(user_id = %user_id, "No stored TripIt credentials");
            None
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to read stored credentials");
            None
        }
    }
}
