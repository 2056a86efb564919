//! Wire types for the JSON API. Field names are camelCase.
//!
//! Request fields are optional so a missing field yields the API's own
//! "... required" message instead of a deserializer error. Clients built
//! against spreadsheet data send phones as numbers, so text fields accept
//! numbers too.

use ev_02_vote_ledger::{ReconcileReport, TallyEntry, VoterStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{CandidateId, Timestamp, VoterId};

/// Read a string or number field as trimmed text; empty counts as missing.
pub fn field_text(value: &Option<Value>) -> Option<String> {
    let text = match value.as_ref()? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendOtpRequest {
    pub phone: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyOtpRequest {
    pub phone: Option<Value>,
    pub otp: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub voter_id: Option<Value>,
    pub candidate_id: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: &'static str,
    pub expires_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub voter_id: VoterId,
    pub has_voted: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voting_pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voting_pass_expires_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteResponse {
    pub success: bool,
    pub message: &'static str,
    pub candidate_id: CandidateId,
    pub candidate_votes: u64,
    pub voted_at: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterStatusResponse {
    pub success: bool,
    #[serde(flatten)]
    pub status: VoterStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyResponse {
    pub success: bool,
    pub candidates: Vec<TallyEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    pub success: bool,
    pub consistent: bool,
    #[serde(flatten)]
    pub report: ReconcileReport,
}
