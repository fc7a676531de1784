//! # Card Numbers & PINs
//!
//! A FERROCARD number is the human-facing identifier of an account. It is
//! built from three parts, ISO/IEC 7812 style:
//!
//! ```text
//! 400000 123456789 3
//! └─────┘└────────┘└─ Luhn check digit over the first 15 digits
//!    │        └────── 9-digit account segment, drawn uniformly at random
//!    └─────────────── Issuer Identification Number, fixed for this system
//! ```
//!
//! The check digit makes addresses hard to fat-finger: a mistyped card
//! number fails validation locally instead of silently routing money to a
//! stranger.
//!
//! The PIN is a separate 4-digit secret, drawn independently of the card
//! number. It carries no structure at all — any relationship between the
//! two would be a free hint to an attacker.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{
    ACCOUNT_SEGMENT_LENGTH, ACCOUNT_SEGMENT_MAX, CARD_NUMBER_LENGTH, ISSUER_PREFIX, PIN_LENGTH,
    PIN_MAX,
};
use crate::luhn;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when parsing a card number from raw input.
///
/// Callers that must not leak *why* a card number was rejected (the
/// transfer destination check, the login path) collapse all variants into
/// a single "malformed" condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardParseError {
    /// The input is not exactly 16 characters.
    #[error("invalid card number length: expected {expected}, got {got}")]
    InvalidLength {
        /// Expected number of characters.
        expected: usize,
        /// Actual number of characters.
        got: usize,
    },

    /// The input contains a character that is not an ASCII decimal digit.
    #[error("card number contains a non-digit character")]
    NonDigit,

    /// The last digit does not match the Luhn checksum of the first 15.
    #[error("card number fails the checksum")]
    ChecksumMismatch,
}

// ---------------------------------------------------------------------------
// CardNumber
// ---------------------------------------------------------------------------

/// A validated 16-digit card number.
///
/// The type is a proof token: holding a `CardNumber` means the string
/// inside has the right length, is all digits, and checksums correctly.
/// Everything downstream (the store, the session, the transfer protocol)
/// trades in this type rather than raw strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardNumber(String);

impl CardNumber {
    /// Parses and validates a raw string as a card number.
    pub fn parse(s: &str) -> Result<Self, CardParseError> {
        if s.len() != CARD_NUMBER_LENGTH {
            return Err(CardParseError::InvalidLength {
                expected: CARD_NUMBER_LENGTH,
                got: s.len(),
            });
        }
        if !luhn::is_valid_card_number(s) {
            // Distinguish non-digit input from a checksum failure; the
            // length case was already handled above.
            if !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CardParseError::NonDigit);
            }
            return Err(CardParseError::ChecksumMismatch);
        }
        Ok(Self(s.to_owned()))
    }

    /// Issues a fresh card number under [`ISSUER_PREFIX`].
    ///
    /// The 9-digit account segment is drawn uniformly from the full
    /// `0..=999_999_999` range and zero-padded, then the Luhn check digit
    /// is appended. Uniqueness is *not* guaranteed here — the ledger's
    /// insert is the backstop, and [`crate::bank::Bank::open_account`]
    /// retries on collision.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let segment = rng.gen_range(0..=ACCOUNT_SEGMENT_MAX);
        let body = format!("{ISSUER_PREFIX}{segment:0width$}", width = ACCOUNT_SEGMENT_LENGTH);
        let digits = luhn::digit_values(&body).expect("generated body is numeric");
        let check = luhn::check_digit(&digits);
        Self(format!("{body}{check}"))
    }

    /// The full 16-digit number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The fixed issuer prefix (first 6 digits).
    pub fn issuer_prefix(&self) -> &str {
        &self.0[..ISSUER_PREFIX.len()]
    }

    /// The random account segment (digits 7 through 15).
    pub fn account_segment(&self) -> &str {
        &self.0[ISSUER_PREFIX.len()..CARD_NUMBER_LENGTH - 1]
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CardNumber {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<[u8]> for CardNumber {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

// ---------------------------------------------------------------------------
// Pin
// ---------------------------------------------------------------------------

/// A 4-digit account PIN, zero-padded.
///
/// Immutable after issue. Stored alongside the account row and compared
/// verbatim at login — this is a teaching-grade ledger, not a HSM; see
/// the project non-goals before filing the "plaintext PIN" issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(String);

impl Pin {
    /// Draws a uniformly random PIN from `0000..=9999`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let value = rng.gen_range(0..=PIN_MAX);
        Self(format!("{value:0width$}", width = PIN_LENGTH))
    }

    /// The PIN digits as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares the PIN against user-supplied input.
    pub fn matches(&self, supplied: &str) -> bool {
        self.0 == supplied
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
