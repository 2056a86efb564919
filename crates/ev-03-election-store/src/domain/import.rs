//! # Voter Roll Import
//!
//! Seeds the store from a JSON file exported by the election office.
//!
//! ## Row Rules
//!
//! | Check | Error code |
//! |-------|------------|
//! | name, pin and phone present | `MISSING_COLUMNS` |
//! | pin at least 3 characters after trimming | `INVALID_PIN` |
//! | phone exactly 10 digits after stripping non-digits | `INVALID_PHONE` |
//! | pin and phone not already registered | `DUPLICATE_ENTRY` |
//! | store accepted the write | `DATABASE_ERROR` |
//!
//! Rejected rows are skipped and reported; accepted rows are inserted.
//! Unlike the OTP path, import does NOT keep the last ten digits of a longer
//! number: a roll entry with extra digits is treated as a data error.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{normalize_phone, Candidate, CandidateId, StoreError, VoterIdentity, PHONE_DIGITS};
use thiserror::Error;
use tracing::{info, warn};

use crate::ports::VoterRegistry;

/// Minimum PIN length accepted from the roll.
pub const MIN_PIN_LEN: usize = 3;

/// File-level import failures.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("seed file contains no voters or candidates")]
    Empty,
}

/// Seed file layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedFile {
    pub candidates: Vec<CandidateRow>,
    pub voters: Vec<VoterRow>,
}

/// One ballot entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRow {
    /// Fixed id, so ballots printed before import stay valid.
    #[serde(default)]
    pub id: Option<CandidateId>,
    pub full_name: String,
    pub party: String,
}

/// One voter roll entry. Spreadsheet exports carry numeric cells, so pin and
/// phone accept strings or numbers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VoterRow {
    #[serde(alias = "Name", alias = "fullName", alias = "FullName")]
    pub name: Value,
    #[serde(alias = "PIN")]
    pub pin: Value,
    #[serde(alias = "Phone")]
    pub phone: Value,
}

/// Row rejection reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportErrorCode {
    MissingColumns,
    InvalidPin,
    InvalidPhone,
    DuplicateEntry,
    DatabaseError,
}

/// A rejected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based position in the `voters` array.
    pub row: usize,
    pub error_code: ImportErrorCode,
    pub message: String,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total_rows: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub candidates_inserted: usize,
    pub errors: Vec<RowError>,
}

/// Read and parse a seed file.
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<SeedFile, ImportError> {
    let raw = std::fs::read_to_string(path)?;
    let seed: SeedFile = serde_json::from_str(&raw)?;
    if seed.voters.is_empty() && seed.candidates.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(seed)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Apply the row rules that do not need the store.
///
/// Returns the voters that passed, each with its row number, and the errors
/// for those that did not.
pub fn validate_voter_rows(rows: &[VoterRow]) -> (Vec<(usize, VoterIdentity)>, Vec<RowError>) {
    let mut accepted = Vec::new();
    let mut errors = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        let name = cell_text(&row.name);
        let pin = cell_text(&row.pin);
        let phone_raw = cell_text(&row.phone);

        if name.is_empty() || pin.is_empty() || phone_raw.is_empty() {
            errors.push(RowError {
                row: row_number,
                error_code: ImportErrorCode::MissingColumns,
                message: "Missing required fields (Name, PIN, Phone).".into(),
            });
            continue;
        }

        if pin.chars().count() < MIN_PIN_LEN {
            errors.push(RowError {
                row: row_number,
                error_code: ImportErrorCode::InvalidPin,
                message: "PIN value is invalid or too short.".into(),
            });
            continue;
        }

        let digit_count = phone_raw.chars().filter(|c| c.is_ascii_digit()).count();
        if digit_count != PHONE_DIGITS {
            errors.push(RowError {
                row: row_number,
                error_code: ImportErrorCode::InvalidPhone,
                message: format!("Phone number must contain exactly {PHONE_DIGITS} digits."),
            });
            continue;
        }

        accepted.push((
            row_number,
            VoterIdentity::new(name, pin, normalize_phone(&phone_raw)),
        ));
    }

    (accepted, errors)
}

/// Insert every valid candidate and voter from `seed` into `registry`.
pub async fn import_seed(registry: &dyn VoterRegistry, seed: &SeedFile) -> ImportReport {
    let mut report = ImportReport {
        total_rows: seed.voters.len(),
        ..ImportReport::default()
    };

    for row in &seed.candidates {
        let mut candidate = Candidate::new(row.full_name.trim(), row.party.trim());
        if let Some(id) = row.id {
            candidate.id = id;
        }
        match registry.register_candidate(candidate).await {
            Ok(()) => report.candidates_inserted += 1,
            Err(e) => warn!(name = %row.full_name, error = %e, "Skipping candidate"),
        }
    }

    let (accepted, mut errors) = validate_voter_rows(&seed.voters);

    for (row, voter) in accepted {
        match registry.register_voter(voter).await {
            Ok(()) => report.inserted += 1,
            Err(StoreError::Duplicate { field, .. }) => errors.push(RowError {
                row,
                error_code: ImportErrorCode::DuplicateEntry,
                message: format!("Duplicate voter found for {}.", field.to_uppercase()),
            }),
            Err(e) => errors.push(RowError {
                row,
                error_code: ImportErrorCode::DatabaseError,
                message: format!("Failed to insert voter: {e}"),
            }),
        }
    }

    errors.sort_by_key(|e| e.row);
    report.skipped = errors.len();
    report.errors = errors;

    info!(
        total = report.total_rows,
        inserted = report.inserted,
        skipped = report.skipped,
        candidates = report.candidates_inserted,
        "Voter roll import finished"
    );
    report
}
