//! Gateway service: router assembly and the HTTP server loop.

use crate::domain::config::ElectionConfig;
use crate::domain::error::GatewayError;
use crate::middleware::{
    cleanup_task, create_cors_layer, AdminAuthLayer, GatewayMetrics, RateLimitLayer,
    TimeoutLayer, TracingLayer,
};
use crate::router::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use ev_01_otp_auth::OtpAuthApi;
use ev_02_vote_ledger::VoteLedgerApi;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

/// How often idle rate-limit buckets are swept.
const BUCKET_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// HTTP front end for the OTP and ledger services.
pub struct ElectionGateway {
    config: ElectionConfig,
    state: AppState,
    rate_limit: RateLimitLayer,
}

impl ElectionGateway {
    /// Create a gateway over already-built services.
    pub fn new(
        config: ElectionConfig,
        otp: Arc<dyn OtpAuthApi>,
        ledger: Arc<dyn VoteLedgerApi>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let metrics = Arc::new(GatewayMetrics::new());
        let rate_limit = RateLimitLayer::new(config.rate_limit.clone(), Arc::clone(&metrics));
        let state = AppState {
            otp,
            ledger,
            metrics,
            require_pass: config.voting.require_pass,
            mode: config.mode,
        };

        Ok(Self {
            config,
            state,
            rate_limit,
        })
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.state.metrics)
    }

    /// Build the full router with middleware.
    ///
    /// Layer order, outermost first: CORS, tracing, rate limit, timeout,
    /// body limit. Admin routes also pass through [`AdminAuthLayer`].
    pub fn router(&self) -> Router {
        let admin = Router::new()
            .route("/reconcile", get(router::reconcile))
            .route_layer(AdminAuthLayer::new(self.config.admin.clone()));

        let middleware = ServiceBuilder::new()
            .layer(TracingLayer::new(Arc::clone(&self.state.metrics)))
            .layer(self.rate_limit.clone())
            .layer(TimeoutLayer::new(self.config.timeouts.request));

        Router::new()
            .route("/api/voters/send-otp", post(router::send_otp))
            .route("/api/voters/verify-otp", post(router::verify_otp))
            .route("/api/voters/cast-vote", post(router::cast_vote))
            .route("/api/voters/status/:id", get(router::voter_status))
            .route("/api/candidates/tally", get(router::tally))
            .nest("/api/admin", admin)
            .route("/health", get(router::health_check))
            .route("/metrics", get(router::metrics))
            .layer(RequestBodyLimitLayer::new(self.config.limits.max_request_size))
            .layer(middleware)
            .layer(create_cors_layer(&self.config.cors))
            .with_state(self.state.clone())
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;

        let cleanup = if self.config.rate_limit.enabled {
            Some(tokio::spawn(cleanup_task(
                self.rate_limit.state(),
                BUCKET_SWEEP_INTERVAL,
                self.config.rate_limit.bucket_idle,
            )))
        } else {
            None
        };

        info!(
            addr = %addr,
            mode = ?self.config.mode,
            require_pass = self.config.voting.require_pass,
            "HTTP gateway listening"
        );

        let router = self.router();
        let result = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| GatewayError::Serve(e.to_string()));

        if let Some(handle) = cleanup {
            handle.abort();
        }
        info!("HTTP gateway stopped");
        result
    }
}
