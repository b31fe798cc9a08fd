//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! # Signature construction
//! ```text
//! base string = METHOD & enc(base URI) & enc(sorted, encoded params)
//! signing key = enc(consumer secret) & enc(token secret or "")
//! signature   = base64(HMAC-SHA1(key, base string))
//! ```
//!
//! Encoding is RFC 3986 unreserved-set percent-encoding with uppercase hex.
//! Params are the protocol params, the query params and any form-encoded
//! body params, each encoded before sorting.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use ring::hmac;
use thiserror::Error;
use url::Url;

use crate::oauth::credentials::{ConsumerSecret, CredentialPair};

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// Errors raised while signing a request.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Authorization header rejected: {0}")]
    InvalidHeader(String),
}

/// Supplies the per-request nonce and timestamp.
pub trait NonceSource: Send + Sync {
    fn nonce(&self) -> String;
    fn timestamp(&self) -> u64;
}

/// Random 32-char alphanumeric nonce and wall-clock seconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNonceSource;

impl NonceSource for SystemNonceSource {
    fn nonce(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect()
    }

    fn timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Always returns the same nonce and timestamp. Used to make signatures reproducible.
#[derive(Debug, Clone)]
pub struct FixedNonceSource {
    pub nonce: String,
    pub timestamp: u64,
}

impl NonceSource for FixedNonceSource {
    fn nonce(&self) -> String {
        self.nonce.clone()
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Everything that goes into one signature.
#[derive(Debug, Clone, Copy)]
pub struct SignatureRequest<'a> {
    pub method: &'a Method,
    pub url: &'a str,
    /// Session credentials; `None` during the request-token step.
    pub token: Option<&'a CredentialPair>,
    /// Extra protocol params such as `oauth_callback` or `oauth_verifier`.
    pub oauth_extras: &'a [(&'a str, &'a str)],
    /// Decoded `application/x-www-form-urlencoded` body params.
    pub form_params: &'a [(String, String)],
}

/// Produces `Authorization` headers for outbound requests.
#[derive(Clone)]
pub struct Signer {
    consumer: ConsumerSecret,
    nonces: Arc<dyn NonceSource>,
}

impl Signer {
    /// Create a signer using a fresh random nonce and the current time per request.
    pub fn new(consumer: ConsumerSecret) -> Self {
        Self::with_nonce_source(consumer, Arc::new(SystemNonceSource))
    }

    pub fn with_nonce_source(consumer: ConsumerSecret, nonces: Arc<dyn NonceSource>) -> Self {
        Self { consumer, nonces }
    }

    pub fn consumer_key(&self) -> &str {
        self.consumer.key()
    }

    /// Sign a body-less request made on behalf of an authorized session.
    pub fn sign(
        &self,
        method: &Method,
        url: &str,
        credentials: &CredentialPair,
    ) -> Result<HeaderMap, SignError> {
        self.sign_request(&SignatureRequest {
            method,
            url,
            token: Some(credentials),
            oauth_extras: &[],
            form_params: &[],
        })
    }

    /// Sign an arbitrary request and return the headers to attach.
    pub fn sign_request(&self, request: &SignatureRequest<'_>) -> Result<HeaderMap, SignError> {
        let header = self.authorization_header(request)?;
        let value = HeaderValue::from_str(&header)
            .map_err(|e| SignError::InvalidHeader(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    /// Build the `OAuth ...` authorization header value.
    pub fn authorization_header(&self, request: &SignatureRequest<'_>) -> Result<String, SignError> {
        let url = Url::parse(request.url).map_err(|source| SignError::InvalidUrl {
            url: request.url.to_string(),
            source,
        })?;
        if url.host_str().is_none() {
            return Err(SignError::MissingHost(request.url.to_string()));
        }

        let mut protocol: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.consumer.key().to_string()),
            ("oauth_nonce".into(), self.nonces.nonce()),
            ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
            ("oauth_timestamp".into(), self.nonces.timestamp().to_string()),
            ("oauth_version".into(), OAUTH_VERSION.into()),
        ];
        if let Some(token) = request.token {
            protocol.push(("oauth_token".into(), token.token().to_string()));
        }
        for (name, value) in request.oauth_extras {
            protocol.push((name.to_string(), value.to_string()));
        }

        let mut params = protocol.clone();
        params.extend(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())));
        params.extend(request.form_params.iter().cloned());

        let base = signature_base_string(request.method, &url, &params);
        let token_secret = request.token.map(CredentialPair::token_secret).unwrap_or("");
        let signature = compute_signature(&base, self.consumer.secret(), token_secret);

        protocol.push(("oauth_signature".into(), signature));
        protocol.sort();

        let fields: Vec<String> = protocol
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect();

        Ok(format!("OAuth {}", fields.join(", ")))
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("consumer", &self.consumer)
            .finish()
    }
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Scheme, host, non-default port and path; no query or fragment.
pub fn base_string_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

/// Build the signature base string from decoded parameters.
pub fn signature_base_string(method: &Method, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        percent_encode(method.as_str()),
        percent_encode(&base_string_uri(url)),
        percent_encode(&normalized)
    )
}

/// Base64 HMAC-SHA1 of `base` keyed by the encoded secret pair.
pub fn compute_signature(base: &str, consumer_secret: &str, token_secret: &str) -> String {
    let signing_key = format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret));
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, signing_key.as_bytes());
    let tag = hmac::sign(&key, base.as_bytes());
    BASE64.encode(tag.as_ref())
}
