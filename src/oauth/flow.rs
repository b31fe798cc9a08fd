//! Three-legged OAuth exchange against TripIt.
//!
//! ```text
//! obtain_request_credential(callback)  → (request token, request secret)
//! build_authorization_target(token)    → URL the user visits
//! exchange_for_access_credential(...)  → (access token, access secret)
//! ```

use std::sync::Arc;

use reqwest::Method;
use url::Url;

use crate::client::transport::{SignedRequest, Transport};
use crate::client::TripItError;
use crate::config::ProviderConfig;
use crate::oauth::credentials::CredentialPair;
use crate::oauth::signer::{SignatureRequest, Signer};

/// Provider endpoints used by the exchange.
#[derive(Debug, Clone)]
pub struct OAuthEndpoints {
    pub request_token_url: String,
    pub access_token_url: String,
    pub authorize_url: String,
}

impl From<&ProviderConfig> for OAuthEndpoints {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            request_token_url: config.request_token_url.clone(),
            access_token_url: config.access_token_url.clone(),
            authorize_url: config.authorize_url.clone(),
        }
    }
}

/// Drives the request-token / authorize / access-token exchange.
#[derive(Clone)]
pub struct OAuthFlow {
    transport: Arc<dyn Transport>,
    signer: Signer,
    endpoints: OAuthEndpoints,
}

impl OAuthFlow {
    pub fn new(transport: Arc<dyn Transport>, signer: Signer, endpoints: OAuthEndpoints) -> Self {
        Self {
            transport,
            signer,
            endpoints,
        }
    }

    /// Fetch a temporary request credential with `callback` embedded.
    pub async fn obtain_request_credential(&self, callback: &str) -> Result<CredentialPair, TripItError> {
        let extras = [("oauth_callback", callback)];
        let url = self.endpoints.request_token_url.clone();
        let pair = self.signed_post(&url, None, &extras).await?;
        tracing::info!(request_token = %pair.token(), "Obtained request token");
        Ok(pair)
    }

    /// The page the user must visit to approve `request_token`.
    pub fn build_authorization_target(
        &self,
        request_token: &str,
        callback: Option<&str>,
    ) -> Result<Url, TripItError> {
        let mut url = Url::parse(&self.endpoints.authorize_url)
            .map_err(|e| TripItError::InvalidRequest(format!("authorize URL: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("oauth_token", request_token);
            if let Some(callback) = callback {
                query.append_pair("oauth_callback", callback);
            }
        }
        Ok(url)
    }

    /// Trade an approved request credential for a long-lived access credential.
    pub async fn exchange_for_access_credential(
        &self,
        request: &CredentialPair,
        verifier: Option<&str>,
    ) -> Result<CredentialPair, TripItError> {
        let extras: Vec<(&str, &str)> = verifier.map(|v| ("oauth_verifier", v)).into_iter().collect();
        let url = self.endpoints.access_token_url.clone();
        let pair = self.signed_post(&url, Some(request), &extras).await?;
        tracing::info!("Exchanged request token for access token");
        Ok(pair)
    }

    async fn signed_post(
        &self,
        url: &str,
        token: Option<&CredentialPair>,
        extras: &[(&str, &str)],
    ) -> Result<CredentialPair, TripItError> {
        let method = Method::POST;
        let headers = self
            .signer
            .sign_request(&SignatureRequest {
                method: &method,
                url,
                token,
                oauth_extras: extras,
                form_params: &[],
            })
            .map_err(|e| TripItError::InvalidRequest(e.to_string()))?;
        let parsed = Url::parse(url).map_err(|e| TripItError::InvalidRequest(e.to_string()))?;

        let response = self
            .transport
            .execute(SignedRequest {
                method,
                url: parsed,
                headers,
                body: None,
            })
            .await
            .map_err(|e| TripItError::Transport(e.0))?;

        if !(200..300).contains(&response.status) {
            tracing::warn!(status = response.status, url = %url, "OAuth token request rejected");
            return Err(TripItError::Protocol(format!(
                "token endpoint returned {}: {}",
                response.status, response.body
            )));
        }

        parse_token_response(&response.body)
    }
}

/// Parse `oauth_token=...&oauth_token_secret=...` from a form-encoded body.
pub fn parse_token_response(body: &str) -> Result<CredentialPair, TripItError> {
    let mut token = None;
    let mut secret = None;
    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        match key.as_ref() {
            "oauth_token" => token = Some(value.into_owned()),
            "oauth_token_secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }

    match (token, secret) {
        (Some(token), Some(secret)) if !token.is_empty() => Ok(CredentialPair::new(token, secret)),
        _ => Err(TripItError::Protocol(
            "token response missing oauth_token or oauth_token_secret".into(),
        )),
    }
}
