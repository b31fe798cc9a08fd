//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, limits, request ID, timeout)
//! - Build the shared state: dispatcher, OAuth flow, token store
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::client::{ResilientClient, ReqwestTransport, TripItError, TripItResult};
use crate::config::{AppConfig, Secrets};
use crate::http::{handlers, oauth};
use crate::mcp::Dispatcher;
use crate::oauth::{CredentialPair, OAuthEndpoints, OAuthFlow, Signer};
use crate::resilience::{RetryPolicy, Throttle};
use crate::store::{MemoryTokenStore, TokenStore};
use crate::tools::TripItTools;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub oauth: Arc<OAuthFlow>,
    pub store: Arc<dyn TokenStore>,
    /// Used when the caller names no user.
    pub default_session: Option<CredentialPair>,
    /// Externally reachable base URL, without trailing slash.
    pub public_url: String,
    pub request_token_ttl: Duration,
}

/// HTTP server for the MCP endpoint and the OAuth web flow.
pub struct HttpServer {
    router: Router,
    /// In-memory store swept while the server runs.
    sweeper: Option<(Arc<MemoryTokenStore>, Duration)>,
}

impl HttpServer {
    /// Build the server with an in-memory token store.
    pub fn new(config: &AppConfig, secrets: Secrets) -> TripItResult<Self> {
        let store = Arc::new(MemoryTokenStore::new());
        let mut server = Self::with_store(config, secrets, store.clone())?;
        server.sweeper = Some((store, Duration::from_secs(config.oauth.sweep_interval_secs)));
        Ok(server)
    }

    pub fn with_store(
        config: &AppConfig,
        secrets: Secrets,
        store: Arc<dyn TokenStore>,
    ) -> TripItResult<Self> {
        let transport = Arc::new(
            ReqwestTransport::new(Duration::from_secs(config.provider.timeout_secs))
                .map_err(|e| TripItError::Transport(e.0))?,
        );
        let signer = Signer::new(secrets.consumer.clone());

        let client = ResilientClient::new(
            transport.clone(),
            signer.clone(),
            &config.provider.api_base_url,
            Throttle::new(Duration::from_millis(config.throttle.min_interval_ms)),
            RetryPolicy::from(&config.retries),
        );
        let tools = Arc::new(TripItTools::new(Arc::new(client)));
        let oauth = OAuthFlow::new(transport, signer, OAuthEndpoints::from(&config.provider));

        let state = AppState {
            dispatcher: Arc::new(Dispatcher::new(tools)),
            oauth: Arc::new(oauth),
            store,
            default_session: secrets.default_session,
            public_url: config.server.public_url.trim_end_matches('/').to_string(),
            request_token_ttl: Duration::from_secs(config.oauth.request_token_ttl_secs),
        };

        Ok(Self::from_state(config, state))
    }

    /// Build the server around prepared state.
    pub fn from_state(config: &AppConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
            sweeper: None,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/mcp", post(handlers::mcp))
            .route("/health", get(handlers::health))
            .route("/oauth/start", get(oauth::start))
            .route("/oauth/callback", get(oauth::callback))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some((store, period)) = self.sweeper {
            tokio::spawn(store.run_sweeper(period, shutdown.resubscribe()));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
