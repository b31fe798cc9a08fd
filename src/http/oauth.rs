//! OAuth web flow endpoints.
//!
//! ```text
//! GET /oauth/start?user_id=U
//!     → request credential (callback carries a fresh state)
//!     → oauth:{state}:* stored with TTL
//!     → 303 to TripIt's authorization page
//! GET /oauth/callback?state=S&oauth_token=T&oauth_verifier=V
//!     → pending request credential looked up by state
//!     → exchanged for an access credential
//!     → user:{U}:access_token(_secret) stored
//! ```

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::http::response::HttpError;
use crate::http::server::AppState;
use crate::oauth::CredentialPair;
use crate::store::{keys, save_user_credentials, StoreError};

#[derive(Debug, Deserialize)]
pub struct StartParams {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
}

fn store_failure(e: StoreError) -> HttpError {
    tracing::error!(error = %e, "Token store failure");
    HttpError::internal("Credential storage is unavailable. Please try again.")
}

pub async fn start(
    State(state): State<AppState>,
    Query(params): Query<StartParams>,
) -> Result<Response, HttpError> {
    let user_id = params
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| HttpError::bad_request("Missing required query parameter: user_id"))?;

    let flow_state = Uuid::new_v4().simple().to_string();
    let callback = format!("{}/oauth/callback?state={}", state.public_url, flow_state);

    let request = state
        .oauth
        .obtain_request_credential(&callback)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to obtain request token");
            HttpError::bad_gateway(format!("Could not start TripIt authorization: {}", e))
        })?;

    let ttl = Some(state.request_token_ttl);
    state
        .store
        .put(&keys::request_token(&flow_state), request.token(), ttl)
        .await
        .map_err(store_failure)?;
    state
        .store
        .put(&keys::request_token_secret(&flow_state), request.token_secret(), ttl)
        .await
        .map_err(store_failure)?;
    state
        .store
        .put(&keys::pending_user(&flow_state), &user_id, ttl)
        .await
        .map_err(store_failure)?;

    let target = state
        .oauth
        .build_authorization_target(request.token(), Some(&callback))
        .map_err(|e| HttpError::internal(e.to_string()))?;

    tracing::info!(user_id = %user_id, "Redirecting to TripIt authorization");
    Ok(Redirect::to(target.as_str()).into_response())
}

pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<String, HttpError> {
    let flow_state = params
        .state
        .ok_or_else(|| HttpError::bad_request("Missing required query parameter: state"))?;

    let token = state
        .store
        .get(&keys::request_token(&flow_state))
        .await
        .map_err(store_failure)?;
    let secret = state
        .store
        .get(&keys::request_token_secret(&flow_state))
        .await
        .map_err(store_failure)?;
    let user_id = state
        .store
        .get(&keys::pending_user(&flow_state))
        .await
        .map_err(store_failure)?;

    let (Some(token), Some(secret), Some(user_id)) = (token, secret, user_id) else {
        return Err(HttpError::bad_request(
            "Authorization session expired or unknown. Start again at /oauth/start.",
        ));
    };

    if let Some(returned) = params.oauth_token.as_deref() {
        if returned != token {
            tracing::warn!(user_id = %user_id, "OAuth callback token mismatch");
            return Err(HttpError::bad_request("Authorization token does not match this session."));
        }
    }

    let request = CredentialPair::new(token, secret);
    let access = state
        .oauth
        .exchange_for_access_credential(&request, params.oauth_verifier.as_deref())
        .await
        .map_err(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "Access token exchange failed");
            HttpError::bad_gateway(format!("Could not complete TripIt authorization: {}", e))
        })?;

    save_user_credentials(state.store.as_ref(), &user_id, &access)
        .await
        .map_err(store_failure)?;

    for key in [
        keys::request_token(&flow_state),
        keys::request_token_secret(&flow_state),
        keys::pending_user(&flow_state),
    ] {
        if let Err(e) = state.store.delete(&key).await {
            tracing::warn!(error = %e, "Failed to clear pending authorization");
        }
    }

    tracing::info!(user_id = %user_id, "TripIt account connected");
    Ok(format!(
        "TripIt account connected for user {}. You can close this window.",
        user_id
    ))
}
