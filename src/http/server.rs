//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Attach one admission pipeline per route group
//! - Wire up middleware (tracing, request ID, timeout, body limit, metrics)
//! - Run the limiter sweep alongside the listener
//! - Serve until the shutdown signal, then drain

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
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

use crate::config::GatewayConfig;
use crate::http::handlers::{enroll, home};
use crate::http::records::{
    create_record, delete_all_records, delete_record, list_records, update_record,
};
use crate::lifecycle::shutdown::wait as wait_for_shutdown;
use crate::observability::metrics;
use crate::pipeline::{admission, Pipeline};
use crate::security::{AdmissionLimiter, CredentialIssuer, KeyMaterial, TokenVerifier};
use crate::store::RecordStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<CredentialIssuer>,
    pub store: Arc<dyn RecordStore>,
}

/// HTTP server for the admission gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    limiter: Arc<AdmissionLimiter>,
}

impl HttpServer {
    /// Create a new HTTP server. `keys` is only borrowed; issuer and
    /// verifier keep their own copies of the halves they need.
    pub fn new(config: GatewayConfig, keys: &KeyMaterial, store: Arc<dyn RecordStore>) -> Self {
        let limiter = Arc::new(AdmissionLimiter::from_config(&config.rate_limit));
        let verifier = Arc::new(TokenVerifier::new(keys));
        let state = AppState {
            issuer: Arc::new(CredentialIssuer::new(keys, config.auth.token_ttl_secs)),
            store,
        };

        let router = Self::build_router(&config, state, limiter.clone(), verifier);
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &GatewayConfig,
        state: AppState,
        limiter: Arc<AdmissionLimiter>,
        verifier: Arc<TokenVerifier>,
    ) -> Router {
        let limits = config
            .rate_limit
            .enabled
            .then(|| (limiter, config.rate_limit.anonymous));

        let open = Pipeline::new();
        let authenticated = Pipeline::authenticated(limits, verifier);
        let privileged = authenticated.clone().require_role(config.auth.admin_role.clone());

        let open_routes = Router::new()
            .route("/", get(home))
            .route("/auth/token", post(enroll))
            .route_layer(middleware::from_fn_with_state(open, admission));

        let read_routes = Router::new()
            .route("/records", get(list_records))
            .route_layer(middleware::from_fn_with_state(authenticated, admission));

        let write_routes = Router::new()
            .route("/records", post(create_record).delete(delete_all_records))
            .route("/records/{id}", put(update_record).delete(delete_record))
            .route_layer(middleware::from_fn_with_state(privileged, admission));

        Router::new()
            .merge(open_routes)
            .merge(read_routes)
            .merge(write_routes)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(track_metrics))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweeper = self.config.rate_limit.enabled.then(|| {
            self.limiter.clone().spawn_sweeper(
                Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
                shutdown.resubscribe(),
            )
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        if let Some(sweeper) = sweeper {
            let _ = sweeper.await;
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
