//! # Configuration & Constants
//!
//! Every magic number in FERROCARD lives here. If you're hardcoding a
//! constant somewhere else, you're doing it wrong and you owe the team
//! coffee.

// ---------------------------------------------------------------------------
// Card Anatomy
// ---------------------------------------------------------------------------

/// Issuer Identification Number — the fixed 6-digit prefix shared by every
/// card this system issues. `4` marks the card as a "Visa-style" number,
/// which keeps the format familiar to anyone who has ever held a debit card.
pub const ISSUER_PREFIX: &str = "400000";

/// Total length of a card number: prefix + account segment + check digit.
pub const CARD_NUMBER_LENGTH: usize = 16;

/// Length of the randomly drawn account segment, zero-padded.
pub const ACCOUNT_SEGMENT_LENGTH: usize = 9;

/// Upper bound (inclusive) of the account segment keyspace.
pub const ACCOUNT_SEGMENT_MAX: u32 = 999_999_999;

/// PIN length. Four digits, zero-padded, like every ATM on the planet.
pub const PIN_LENGTH: usize = 4;

/// Upper bound (inclusive) of the PIN keyspace.
pub const PIN_MAX: u16 = 9_999;

// ---------------------------------------------------------------------------
// Account Issuing
// ---------------------------------------------------------------------------

/// How many times card generation retries after a keyspace collision
/// before giving up. With a billion-slot segment space, hitting this
/// bound means either the ledger holds most of the keyspace or the RNG
/// is broken — both are worth a hard error rather than a silent loop.
pub const MAX_GENERATION_ATTEMPTS: u32 = 16;

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Name of the sled tree that holds account rows.
pub const ACCOUNTS_TREE: &str = "accounts";

/// Default data directory, relative to the user's home.
pub const DEFAULT_DATA_DIR: &str = ".ferrocard";

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Library version, straight from Cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
