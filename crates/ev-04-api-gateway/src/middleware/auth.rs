//! Admin authentication middleware.
//!
//! Guards the `/api/admin` routes: the caller must connect from localhost
//! (unless `allow_external` is set) and present the API key when one is
//! configured. Voter-facing routes are not wrapped by this layer.

use crate::domain::config::AdminConfig;
use crate::ApiError;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Authentication layer for operator endpoints
#[derive(Clone)]
pub struct AdminAuthLayer {
    config: Arc<AdminConfig>,
}

impl AdminAuthLayer {
    pub fn new(config: AdminConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for AdminAuthLayer {
    type Service = AdminAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdminAuthService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AdminAuthService<S> {
    inner: S,
    config: Arc<AdminConfig>,
}

impl<S> Service<Request<Body>> for AdminAuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let config = Arc::clone(&self.config);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let is_localhost = is_request_from_localhost(&req);
            let has_valid_key = check_api_key(&req, &config);

            debug!(
                path = %req.uri().path(),
                is_localhost,
                has_valid_key,
                "Checking admin authorization"
            );

            if !is_localhost && !config.allow_external {
                warn!(path = %req.uri().path(), "Admin access denied - localhost required");
                return Ok(ApiError::forbidden("admin endpoints require localhost access")
                    .into_response());
            }

            if !has_valid_key {
                warn!(path = %req.uri().path(), "Admin access denied - API key required");
                return Ok(ApiError::unauthorized("admin endpoints require an API key")
                    .into_response());
            }

            inner.call(req).await
        })
    }
}

/// Check if request is from localhost.
///
/// Only the socket peer counts; forwarded headers are caller-controlled.
fn is_request_from_localhost<B>(req: &Request<B>) -> bool {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| is_localhost_ip(info.0.ip()))
        .unwrap_or(false)
}

/// Check if IP is loopback
pub(crate) fn is_localhost_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => v6.is_loopback() || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback()),
    }
}

/// Check API key from `Authorization: Bearer` or `X-API-Key`
fn check_api_key<B>(req: &Request<B>, config: &AdminConfig) -> bool {
    let Some(expected_key) = &config.api_key else {
        return true;
    };

    if let Some(token) = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return constant_time_compare(token.trim(), expected_key);
    }

    req.headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| constant_time_compare(key.trim(), expected_key))
}

/// Constant-time string comparison.
///
/// Runs in time independent of how many leading bytes match. Length
/// mismatch is folded into the same constant-time result.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = a.len().max(b.len());

    // Distinct pad bytes so a length difference can never compare equal.
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}
