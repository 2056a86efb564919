//! Route handlers.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /api/voters/send-otp` | [`send_otp`] |
//! | `POST /api/voters/verify-otp` | [`verify_otp`] |
//! | `POST /api/voters/cast-vote` | [`cast_vote`] |
//! | `GET /api/voters/status/:id` | [`voter_status`] |
//! | `GET /api/candidates/tally` | [`tally`] |
//! | `GET /api/admin/reconcile` | [`reconcile`] |
//! | `GET /health` | [`health_check`] |
//! | `GET /metrics` | [`metrics`] |

use crate::domain::config::RunMode;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{
    field_text, CastVoteRequest, CastVoteResponse, ReconcileResponse, SendOtpRequest,
    SendOtpResponse, TallyResponse, VerifyOtpRequest, VerifyOtpResponse, VoterStatusResponse,
};
use crate::middleware::GatewayMetrics;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use ev_01_otp_auth::OtpAuthApi;
use ev_02_vote_ledger::{VoteError, VoteLedgerApi};
use serde::de::DeserializeOwned;
use shared_types::{CandidateId, VoterId};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub otp: Arc<dyn OtpAuthApi>,
    pub ledger: Arc<dyn VoteLedgerApi>,
    pub metrics: Arc<GatewayMetrics>,
    /// Cast-vote needs a voting pass from verify-otp.
    pub require_pass: bool,
    pub mode: RunMode,
}

/// Parse a JSON body; an empty body reads as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Issue an OTP to a registered, unvoted voter.
pub async fn send_otp(State(state): State<AppState>, body: Bytes) -> ApiResult<impl IntoResponse> {
    let req: SendOtpRequest = parse_body(&body)?;
    let phone = field_text(&req.phone).ok_or_else(|| ApiError::bad_request("phone required"))?;

    let issued = state.otp.issue_otp(&phone).await?;
    state.metrics.record_otp_issued();
    if !issued.delivered {
        warn!(phone = %issued.phone.masked(), "OTP stored but delivery failed");
    }

    Ok(Json(SendOtpResponse {
        success: true,
        message: "OTP sent",
        expires_at: issued.expires_at,
        otp: issued.dev_code,
    }))
}

/// Check a presented code and hand out a voting pass.
pub async fn verify_otp(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let req: VerifyOtpRequest = parse_body(&body)?;
    let (Some(phone), Some(otp)) = (field_text(&req.phone), field_text(&req.otp)) else {
        return Err(ApiError::bad_request("phone and otp required"));
    };

    let result = state.otp.verify_otp(&phone, &otp).await;
    state.metrics.record_otp_verification(result.is_ok());
    let verified = result?;

    let (voting_pass, voting_pass_expires_at) = match verified.voting_pass {
        Some(pass) => (Some(pass.token), Some(pass.expires_at)),
        None => (None, None),
    };

    Ok(Json(VerifyOtpResponse {
        success: true,
        voter_id: verified.voter_id,
        has_voted: verified.has_voted,
        message: "OTP verified",
        voting_pass,
        voting_pass_expires_at,
    }))
}

/// Record a vote.
pub async fn cast_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let req: CastVoteRequest = parse_body(&body)?;
    let (Some(voter_raw), Some(candidate_raw)) =
        (field_text(&req.voter_id), field_text(&req.candidate_id))
    else {
        return Err(ApiError::bad_request("voterId and candidateId required"));
    };

    let voter: VoterId = voter_raw
        .parse()
        .map_err(|_| ApiError::bad_request("invalid voterId"))?;
    let candidate: CandidateId = candidate_raw
        .parse()
        .map_err(|_| ApiError::bad_request("invalid candidateId"))?;

    if state.require_pass {
        let token = bearer_token(&headers)
            .ok_or_else(|| ApiError::unauthorized("voting pass required"))?;
        state.otp.authorize_vote(token, &voter)?;
    }

    let result = state.ledger.cast_vote(&voter, &candidate).await;
    state.metrics.record_vote(result.is_ok());
    if let Err(VoteError::IntegrityViolation { .. }) = &result {
        state.metrics.record_integrity_event();
    }
    let receipt = result?;

    info!(voter_id = %receipt.voter_id, candidate_id = %receipt.candidate_id, "Vote recorded");

    Ok(Json(CastVoteResponse {
        success: true,
        message: "Vote recorded successfully",
        candidate_id: receipt.candidate_id,
        candidate_votes: receipt.candidate_votes,
        voted_at: receipt.voted_at,
    }))
}

pub async fn voter_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let voter: VoterId = id
        .parse()
        .map_err(|_| ApiError::bad_request("invalid voterId"))?;
    let status = state.ledger.voter_status(&voter).await?;
    Ok(Json(VoterStatusResponse {
        success: true,
        status,
    }))
}

pub async fn tally(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let candidates = state.ledger.tally().await?;
    Ok(Json(TallyResponse {
        success: true,
        candidates,
    }))
}

/// Recount votes and report tallies that drifted after an integrity event.
pub async fn reconcile(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let report = state.ledger.reconcile().await?;
    if !report.is_consistent() {
        warn!(
            target: "integrity",
            mismatches = report.mismatches.len(),
            "Stored tallies differ from recount"
        );
    }
    Ok(Json(ReconcileResponse {
        success: true,
        consistent: report.is_consistent(),
        report,
    }))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "election-gateway",
        "mode": state.mode,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}
