//! # One-Time Codes
//!
//! Generation from the OS CSPRNG and keyed hashing for storage.
//!
//! The stored form is `HMAC-SHA256(secret, phone ":" code)`. Binding the phone
//! into the MAC input means a hash leaked for one voter cannot be replayed
//! against another, and without the server secret a 10^6 code space cannot
//! be brute-forced offline.

use std::fmt;

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::Rng;
use sha2::Sha256;
use shared_types::NormalizedPhone;
use subtle::ConstantTimeEq;

use super::errors::OtpError;

type HmacSha256 = Hmac<Sha256>;

/// Number of decimal digits in a code.
pub const CODE_LENGTH: usize = 6;

const CODE_SPACE: u32 = 1_000_000;

/// Keyed digest of a code, as kept in the challenge store.
pub type CodeHash = [u8; 32];

/// A plaintext code. `Debug` never prints the digits.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Draw a uniformly random, zero-padded six digit code.
    pub fn generate() -> Self {
        let value = OsRng.gen_range(0..CODE_SPACE);
        Self(format!("{value:0width$}", width = CODE_LENGTH))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the code is exactly six ASCII digits.
    pub fn is_well_formed(code: &str) -> bool {
        code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}

/// Server-side key for code hashing and voting passes.
#[derive(Clone)]
pub struct OtpSecret {
    keyed: HmacSha256,
}

impl OtpSecret {
    /// Build from raw key bytes. Empty keys are rejected.
    pub fn new(key: &[u8]) -> Result<Self, OtpError> {
        if key.is_empty() {
            return Err(OtpError::InvalidSecret);
        }
        let keyed = HmacSha256::new_from_slice(key).map_err(|_| OtpError::InvalidSecret)?;
        Ok(Self { keyed })
    }

    /// Hash a presented or generated code for `phone`.
    pub fn hash(&self, phone: &NormalizedPhone, code: &str) -> CodeHash {
        self.mac(&[phone.as_str().as_bytes(), b":", code.as_bytes()])
    }

    /// MAC over the concatenation of `parts`.
    pub(crate) fn mac(&self, parts: &[&[u8]]) -> [u8; 32] {
        let mut mac = self.keyed.clone();
        for part in parts {
            mac.update(part);
        }
        mac.finalize().into_bytes().into()
    }

    /// Constant-time check of `tag` against the MAC over `parts`.
    pub(crate) fn verify(&self, parts: &[&[u8]], tag: &[u8]) -> bool {
        let mut mac = self.keyed.clone();
        for part in parts {
            mac.update(part);
        }
        mac.verify_slice(tag).is_ok()
    }
}

impl fmt::Debug for OtpSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpSecret([REDACTED])")
    }
}

/// Constant-time digest comparison.
pub fn hashes_match(stored: &CodeHash, presented: &CodeHash) -> bool {
    stored[..].ct_eq(&presented[..]).into()
}
