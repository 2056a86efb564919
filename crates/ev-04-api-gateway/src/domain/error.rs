//! HTTP error type and mappings from domain errors.
//!
//! Every failure body has the shape `{"success": false, "message": ...}`,
//! plus `alreadyVoted: true` where that applies.
//!
//! | Domain error | Status | Message |
//! |--------------|--------|---------|
//! | `ChallengeNotFound`, `InvalidCode` | 400 | invalid or expired otp |
//! | `Expired` | 400 | otp expired |
//! | `AttemptsExceeded` | 429 | too many failed attempts |
//! | `VoterNotFound`, `CandidateNotFound` | 404 | ... not found |
//! | `AlreadyVoted` (send-otp) | 400 | already voted |
//! | `AlreadyVoted` (cast-vote) | 409 | already voted |
//! | `UpstreamUnavailable`, `StoreFull` | 503 | service unavailable |
//! | `IntegrityViolation` | 500 | pending reconciliation |

use std::fmt;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use ev_01_otp_auth::{OtpError, PassError};
use ev_02_vote_ledger::VoteError;
use serde_json::json;
use tracing::error;

/// Shared message for missing and wrong codes, so responses do not reveal
/// whether a challenge exists.
pub const GENERIC_OTP_FAILURE: &str = "invalid or expired otp";

/// Error returned from a handler or middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub already_voted: bool,
    /// Seconds for the `Retry-After` header.
    pub retry_after_secs: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            already_voted: false,
            retry_after_secs: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn timeout() -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, "request timed out")
    }

    pub fn rate_limited(retry_after_ms: u64) -> Self {
        Self {
            retry_after_secs: Some(retry_after_ms.div_ceil(1000).max(1)),
            ..Self::new(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded")
        }
    }

    fn already_voted(status: StatusCode, message: &str) -> Self {
        Self {
            already_voted: true,
            ..Self::new(status, message)
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "message": self.message,
        });
        if self.already_voted {
            body["alreadyVoted"] = json!(true);
        }

        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = self.retry_after_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::bad_request(format!("invalid request body: {e}"))
    }
}

impl From<OtpError> for ApiError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::VoterNotFound => ApiError::not_found("Voter not found"),
            OtpError::AlreadyVoted => ApiError::already_voted(
                StatusCode::BAD_REQUEST,
                "You have already voted. OTP cannot be sent.",
            ),
            OtpError::ChallengeNotFound | OtpError::InvalidCode { .. } => {
                ApiError::bad_request(GENERIC_OTP_FAILURE)
            }
            OtpError::Expired => ApiError::bad_request("otp expired"),
            OtpError::AttemptsExceeded => ApiError::new(
                StatusCode::TOO_MANY_REQUESTS,
                "too many failed attempts, request a new otp",
            ),
            OtpError::StoreFull => ApiError::unavailable("otp service busy, try again later"),
            OtpError::UpstreamUnavailable(reason) => {
                error!(reason = %reason, "Voter store unavailable during OTP flow");
                ApiError::unavailable("service temporarily unavailable")
            }
            OtpError::InvalidSecret => {
                error!("OTP secret rejected by MAC");
                ApiError::internal("server error")
            }
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::VoterNotFound => ApiError::not_found("Voter not found"),
            VoteError::CandidateNotFound => ApiError::not_found("Candidate not found"),
            VoteError::AlreadyVoted => {
                ApiError::already_voted(StatusCode::CONFLICT, "Voter already voted")
            }
            // Already logged on the integrity target by the ledger.
            VoteError::IntegrityViolation { .. } => ApiError::internal(
                "vote recorded but the tally update failed; it will be reconciled",
            ),
            VoteError::UpstreamUnavailable(reason) => {
                error!(reason = %reason, "Election store unavailable");
                ApiError::unavailable("service temporarily unavailable")
            }
        }
    }
}

impl From<PassError> for ApiError {
    fn from(err: PassError) -> Self {
        match err {
            PassError::Malformed | PassError::BadSignature => {
                ApiError::unauthorized("invalid voting pass")
            }
            PassError::Expired => ApiError::unauthorized("voting pass expired, verify again"),
            PassError::WrongVoter => ApiError::forbidden("voting pass does not match voter"),
        }
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Service-level errors (startup and serving)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server stopped with an error
    #[error("server error: {0}")]
    Serve(String),
}
