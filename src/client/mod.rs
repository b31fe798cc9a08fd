//! Resilient TripIt API client.
//!
//! # Responsibilities
//! - Build the request URL and form body for one logical call
//! - Throttle, sign and send each attempt
//! - Retry retryable failures with exponential backoff
//! - Return the parsed JSON payload or a classified error
//!
//! # Wire format
//! ```text
//! GET  {base}{path}/format/json?{query}
//! POST {base}{path}   body: format=json&json=<percent-encoded JSON>
//! ```

pub mod api;
pub mod error;
pub mod objects;
pub mod transport;

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::oauth::signer::{percent_encode, SignatureRequest};
use crate::oauth::{CredentialPair, Signer};
use crate::observability::metrics;
use crate::resilience::retries::{classify_response, classify_transport};
use crate::resilience::{AttemptOutcome, RetryPolicy, Throttle};

pub use api::TripItSession;
pub use error::{TripItError, TripItResult};
pub use objects::ObjectType;
pub use transport::{RawResponse, ReqwestTransport, SignedRequest, Transport, TransportFailure};

/// Path plus decoded query parameters, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
    query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add `key=true` only when `flag` is set.
    pub fn flag(self, key: &str, flag: bool) -> Self {
        if flag {
            self.query(key, "true")
        } else {
            self
        }
    }

    pub fn query_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.query(key, v),
            _ => self,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }
}

/// One prepared logical call, reused unchanged across attempts.
struct PreparedCall {
    method: Method,
    url: Url,
    form: Vec<(String, String)>,
    body: Option<String>,
}

/// Throttled, signed, retrying client for the TripIt v1 API.
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    signer: Signer,
    throttle: Throttle,
    policy: RetryPolicy,
    base_url: String,
}

impl ResilientClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        signer: Signer,
        base_url: &str,
        throttle: Throttle,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            signer,
            throttle,
            policy,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Bind a credential pair to get the domain operations.
    pub fn session(&self, credentials: CredentialPair) -> TripItSession<'_> {
        TripItSession::new(self, credentials)
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Execute one logical call.
    ///
    /// Returns on the first success or fatal failure; otherwise retries up
    /// to the policy's attempt limit, waiting `base * 2^attempt` between
    /// attempts but never after the last one.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &Endpoint,
        body: Option<&Value>,
        credentials: &CredentialPair,
    ) -> TripItResult<Value> {
        let call = self.prepare(method, endpoint, body)?;
        let mut last_error: Option<TripItError> = None;

        for attempt in 0..self.policy.max_attempts {
            self.throttle.acquire().await;

            match self.attempt(&call, credentials).await {
                AttemptOutcome::Success(payload) => {
                    tracing::debug!(method = %call.method, path = %call.url.path(), attempt, "Provider call succeeded");
                    return Ok(payload);
                }
                AttemptOutcome::Fatal(error) => {
                    tracing::warn!(method = %call.method, path = %call.url.path(), attempt, error = %error, "Provider call failed");
                    return Err(error);
                }
                AttemptOutcome::Retryable(error) => {
                    if self.policy.has_next(attempt) {
                        let delay = self.policy.delay_for(attempt);
                        tracing::warn!(
                            method = %call.method,
                            path = %call.url.path(),
                            attempt,
                            delay = ?delay,
                            error = %error,
                            "Retrying provider call"
                        );
                        metrics::record_retry(error.kind());
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(error);
                }
            }
        }

        let error = last_error.unwrap_or(TripItError::Exhausted {
            attempts: self.policy.max_attempts,
        });
        tracing::error!(method = %call.method, path = %call.url.path(), error = %error, "Provider call exhausted retries");
        Err(error)
    }

    /// One throttled-already attempt: sign, send, classify, parse.
    async fn attempt(&self, call: &PreparedCall, credentials: &CredentialPair) -> AttemptOutcome<Value> {
        let started = std::time::Instant::now();

        let headers = match self.signer.sign_request(&SignatureRequest {
            method: &call.method,
            url: call.url.as_str(),
            token: Some(credentials),
            oauth_extras: &[],
            form_params: &call.form,
        }) {
            Ok(headers) => headers,
            Err(e) => return AttemptOutcome::Fatal(TripItError::InvalidRequest(e.to_string())),
        };

        let outcome = match self
            .transport
            .execute(SignedRequest {
                method: call.method.clone(),
                url: call.url.clone(),
                headers,
                body: call.body.clone(),
            })
            .await
        {
            Ok(response) => match classify_response(response) {
                AttemptOutcome::Success(body) => match parse_payload(&body) {
                    Ok(payload) => AttemptOutcome::Success(payload),
                    Err(error) => AttemptOutcome::Fatal(error),
                },
                AttemptOutcome::Retryable(error) => AttemptOutcome::Retryable(error),
                AttemptOutcome::Fatal(error) => AttemptOutcome::Fatal(error),
            },
            Err(failure) => classify_transport(failure),
        };

        metrics::record_attempt(outcome.label(), started);
        outcome
    }

    fn prepare(&self, method: Method, endpoint: &Endpoint, body: Option<&Value>) -> TripItResult<PreparedCall> {
        let mut raw = format!("{}{}", self.base_url, endpoint.path());
        if method == Method::GET {
            raw.push_str("/format/json");
        }

        let mut url = Url::parse(&raw)
            .map_err(|e| TripItError::InvalidRequest(format!("invalid URL '{}': {}", raw, e)))?;
        if !endpoint.query_pairs().is_empty() {
            url.query_pairs_mut().extend_pairs(endpoint.query_pairs());
        }

        let (form, encoded) = match body {
            Some(body) => {
                let json = serde_json::to_string(body)
                    .map_err(|e| TripItError::InvalidRequest(e.to_string()))?;
                let encoded = format!("format=json&json={}", percent_encode(&json));
                (vec![("format".to_string(), "json".to_string()), ("json".to_string(), json)], Some(encoded))
            }
            None => (Vec::new(), None),
        };

        Ok(PreparedCall {
            method,
            url,
            form,
            body: encoded,
        })
    }
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("base_url", &self.base_url)
            .field("policy", &self.policy)
            .field("min_interval", &self.throttle.min_interval())
            .finish()
    }
}

fn parse_payload(body: &str) -> TripItResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(body).map_err(|e| TripItError::Protocol(format!("invalid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::testing::ScriptedTransport;
    use crate::oauth::ConsumerSecret;
    use std::time::Duration;
    use reqwest::header::AUTHORIZATION;
    use serde_json::json;
    use tokio::time::Instant;

    fn client(transport: Arc<ScriptedTransport>) -> ResilientClient {
        ResilientClient::new(
            transport,
            Signer::new(ConsumerSecret::new("ck", "cs")),
            "https://api.tripit.com/v1/",
            Throttle::new(Duration::from_millis(400)),
            RetryPolicy::default(),
        )
    }

    fn creds() -> CredentialPair {
        CredentialPair::new("tok", "toksecret")
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_server_errors_then_success() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedTransport::status(500),
            ScriptedTransport::status(500),
            ScriptedTransport::ok(r#"{"Trip":{"id":"3"}}"#),
        ]));
        let client = client(transport.clone());

        let start = Instant::now();
        let payload = client
            .request(Method::GET, &Endpoint::new("/get/trip/id/3"), None, &creds())
            .await
            .unwrap();

        assert_eq!(payload, json!({"Trip": {"id": "3"}}));
        assert_eq!(transport.calls(), 3);
        // Waited 1000 ms then 2000 ms; the throttle window is already covered.
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_authentication_failure_is_immediate() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedTransport::status(401),
            ScriptedTransport::ok("{}"),
        ]));
        let client = client(transport.clone());

        let start = Instant::now();
        let err = client
            .request(Method::GET, &Endpoint::new("/list/trip"), None, &creds())
            .await
            .unwrap_err();

        assert!(matches!(err, TripItError::Authentication));
        assert_eq!(transport.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_statuses_do_not_retry() {
        for (status, kind) in [(404u16, "not_found"), (400, "provider"), (403, "provider")] {
            let transport = Arc::new(ScriptedTransport::new(vec![ScriptedTransport::status(status)]));
            let client = client(transport.clone());
            let start = Instant::now();
            let err = client
                .request(Method::GET, &Endpoint::new("/get/air/id/1"), None, &creds())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), kind);
            assert_eq!(err.status(), Some(status));
            assert_eq!(transport.calls(), 1);
            assert_eq!(start.elapsed(), Duration::ZERO);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error_without_trailing_wait() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedTransport::status(503),
            ScriptedTransport::down(),
            ScriptedTransport::status(429),
            ScriptedTransport::ok("{}"),
        ]));
        let client = client(transport.clone());

        let start = Instant::now();
        let err = client
            .request(Method::GET, &Endpoint::new("/list/trip"), None, &creds())
            .await
            .unwrap_err();

        assert!(matches!(err, TripItError::Provider { status: 429, .. }));
        assert_eq!(transport.calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failures_are_retried() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedTransport::down(),
            ScriptedTransport::ok(r#"{"ok":true}"#),
        ]));
        let client = client(transport.clone());

        let payload = client
            .request(Method::GET, &Endpoint::new("/get/profile"), None, &creds())
            .await
            .unwrap();
        assert_eq!(payload["ok"], json!(true));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_respect_throttle() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client(transport.clone());

        let start = Instant::now();
        for _ in 0..3 {
            client
                .request(Method::GET, &Endpoint::new("/get/profile"), None, &creds())
                .await
                .unwrap();
        }
        assert_eq!(start.elapsed(), Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_json_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new(vec![ScriptedTransport::ok("<html>")]));
        let client = client(transport.clone());

        let err = client
            .request(Method::GET, &Endpoint::new("/list/trip"), None, &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, TripItError::Protocol(_)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_wire_format() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client(transport.clone());

        client
            .request(
                Method::GET,
                &Endpoint::new("/list/trip").flag("past", true).query("page_num", 1),
                None,
                &creds(),
            )
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(
            sent.url.as_str(),
            "https://api.tripit.com/v1/list/trip/format/json?past=true&page_num=1"
        );
        assert!(sent.body.is_none());
        let auth = sent.headers.get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert!(auth.starts_with("OAuth "));
        assert!(auth.contains("oauth_token=\"tok\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_wire_format() {
        let transport = Arc::new(ScriptedTransport::default());
        let client = client(transport.clone());

        client
            .request(
                Method::POST,
                &Endpoint::new("/create"),
                Some(&json!({"Trip": {"display_name": "Paris & back"}})),
                &creds(),
            )
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.url.as_str(), "https://api.tripit.com/v1/create");
        let body = sent.body.as_deref().unwrap();
        assert!(body.starts_with("format=json&json="));

        let decoded: Vec<(String, String)> = url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(decoded[0], ("format".into(), "json".into()));
        let json: Value = serde_json::from_str(&decoded[1].1).unwrap();
        assert_eq!(json["Trip"]["display_name"], "Paris & back");
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_attempt_is_freshly_signed() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ScriptedTransport::status(502),
            ScriptedTransport::ok("{}"),
        ]));
        let client = client(transport.clone());
        client
            .request(Method::GET, &Endpoint::new("/list/trip"), None, &creds())
            .await
            .unwrap();

        let sent = transport.requests();
        assert_ne!(sent[0].headers.get(AUTHORIZATION), sent[1].headers.get(AUTHORIZATION));
    }
}
