//! # Phone Normalizer
//!
//! Canonicalizes free-form phone input into the fixed-length digit key used
//! by the OTP Store and the voter index.
//!
//! Rules: strip every non-digit; if more than [`PHONE_DIGITS`] digits remain,
//! keep the last [`PHONE_DIGITS`]. There is no error path. Short or garbage
//! input yields a key that simply matches no voter.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of a canonical phone key.
pub const PHONE_DIGITS: usize = 10;

/// A phone number that has been through [`normalize_phone`].
///
/// Deserialization normalizes as well, so a record loaded from JSON can never
/// carry a raw phone string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the key has the full canonical length.
    pub fn is_complete(&self) -> bool {
        self.0.len() == PHONE_DIGITS
    }

    /// Masked form for logs, e.g. `******3210`.
    pub fn masked(&self) -> String {
        let keep = self.0.len().min(4);
        let hidden = self.0.len() - keep;
        format!("{}{}", "*".repeat(hidden), &self.0[hidden..])
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedPhone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for NormalizedPhone {
    fn from(raw: String) -> Self {
        normalize_phone(&raw)
    }
}

impl From<NormalizedPhone> for String {
    fn from(phone: NormalizedPhone) -> Self {
        phone.0
    }
}

/// Normalize an arbitrary phone string.
pub fn normalize_phone(raw: &str) -> NormalizedPhone {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > PHONE_DIGITS {
        // ASCII digits only, so byte slicing is char-aligned
        NormalizedPhone(digits[digits.len() - PHONE_DIGITS..].to_string())
    } else {
        NormalizedPhone(digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_formatting() {
        assert_eq!(normalize_phone("(987) 654-3210").as_str(), "9876543210");
        assert_eq!(normalize_phone(" 98765 43210 ").as_str(), "9876543210");
    }

    #[test]
    fn test_keeps_last_ten_digits() {
        assert_eq!(normalize_phone("+91 98765 43210").as_str(), "9876543210");
        assert_eq!(normalize_phone("0091-9876543210").as_str(), "9876543210");
    }

    #[test]
    fn test_short_and_empty_input() {
        let short = normalize_phone("12-34");
        assert_eq!(short.as_str(), "1234");
        assert!(!short.is_complete());
        assert_eq!(normalize_phone("no digits").as_str(), "");
    }

    #[test]
    fn test_non_ascii_digits_are_dropped() {
        // Devanagari digits are not ASCII digits
        assert_eq!(normalize_phone("९८७6543210").as_str(), "6543210");
    }

    #[test]
    fn test_masked() {
        assert_eq!(normalize_phone("9876543210").masked(), "******3210");
        assert_eq!(normalize_phone("12").masked(), "12");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let phone: NormalizedPhone = serde_json::from_str("\"+1 (987) 654-3210\"").unwrap();
        assert_eq!(phone.as_str(), "9876543210");
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"9876543210\"");
    }

    proptest! {
        #[test]
        fn prop_output_is_at_most_ten_ascii_digits(raw in ".{0,64}") {
            let phone = normalize_phone(&raw);
            prop_assert!(phone.as_str().len() <= PHONE_DIGITS);
            prop_assert!(phone.as_str().chars().all(|c| c.is_ascii_digit()));
        }

        #[test]
        fn prop_normalization_is_idempotent(raw in ".{0,64}") {
            let once = normalize_phone(&raw);
            let twice = normalize_phone(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_formatting_does_not_change_key(digits in "[0-9]{10}", sep in "[ ()+.-]{0,3}") {
            let formatted: String = digits
                .chars()
                .flat_map(|c| std::iter::once(c).chain(sep.chars()))
                .collect();
            let normalized = normalize_phone(&formatted);
            prop_assert_eq!(normalized.as_str(), digits.as_str());
        }
    }
}
