//! # Account Store — The Persistent Ledger
//!
//! The persistence layer for FERROCARD, built on sled's embedded key-value
//! store. All on-disk data flows through this module.
//!
//! ## Layout
//!
//! One sled tree, `accounts`:
//!
//! | Tree       | Key                    | Value              |
//! |------------|------------------------|--------------------|
//! | `accounts` | card number (UTF-8)    | `bincode(Account)` |
//!
//! Opening the tree is idempotent, so schema initialization is simply
//! "open the store" — safe to do on every startup.
//!
//! ## Atomicity & Durability
//!
//! Single-row writes are atomic in sled by construction. The two-row
//! debit+credit pair of a transfer runs inside a sled transaction: either
//! both rows land or neither does, and conflicting writers retry rather
//! than deadlock. Every mutation is followed by a `flush()` before the
//! operation reports success, so a write that returned `Ok` is on disk.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Tree};
use thiserror::Error;

use crate::card::{CardNumber, Pin};
use crate::config::ACCOUNTS_TREE;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying sled database reported an I/O or corruption error.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// A row could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An insert collided with an existing card number.
    ///
    /// For freshly generated numbers this is the astronomically rare
    /// keyspace collision — the issuing path treats it as "roll again",
    /// never as a user-visible failure.
    #[error("card number already on file: {0}")]
    DuplicateCard(String),

    /// The card number has no row in the ledger.
    #[error("no account on file for card {0}")]
    NotFound(String),

    /// A balance adjustment would overflow the i64 range.
    ///
    /// If you're hitting this, someone is trying to move more than nine
    /// quintillion minor units. That's either a bug or an attack.
    #[error("balance overflow: current {current}, delta {delta}")]
    BalanceOverflow {
        /// The balance before the failed adjustment.
        current: i64,
        /// The delta that caused the overflow.
        delta: i64,
    },

    /// A transfer debit exceeds the sender's available balance.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// The sender's current balance.
        available: i64,
        /// The amount the transfer asked for.
        requested: i64,
    },
}

/// Convenience alias used throughout the storage layer.
pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// One row of the ledger: a card, its PIN, and its balance.
///
/// Balances are `i64` minor units. The type permits negative values —
/// the *transfer protocol* enforces non-negativity via its sufficiency
/// check, deliberately not the storage layer (see
/// [`AccountStore::adjust_balance`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The 16-digit card number. Also the row key.
    pub card_number: CardNumber,
    /// The 4-digit PIN, fixed at issue time.
    pub pin: Pin,
    /// Balance in minor currency units.
    pub balance: i64,
    /// When the account was opened.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a fresh zero-balance account row.
    pub fn new(card_number: CardNumber, pin: Pin) -> Self {
        Self {
            card_number,
            pin,
            balance: 0,
            created_at: Utc::now(),
        }
    }
}

fn encode(account: &Account) -> StoreResult<Vec<u8>> {
    bincode::serialize(account).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> StoreResult<Account> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// AccountStore
// ---------------------------------------------------------------------------

/// The persistent account ledger.
///
/// Wraps a sled `Db` and the `accounts` tree, exposing typed row
/// operations. sled trees support lock-free concurrent reads and
/// serialized writes, so an `AccountStore` can be shared across threads
/// behind an `Arc` without extra locking.
#[derive(Debug, Clone)]
pub struct AccountStore {
    /// The underlying sled database handle. Kept for `flush()`.
    db: Db,
    /// Account rows keyed by card number.
    accounts: Tree,
}

impl AccountStore {
    /// Opens (or creates) the ledger at the given filesystem path.
    ///
    /// Creating the tree on every open doubles as idempotent schema
    /// initialization; existing rows are available immediately.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Creates a temporary in-memory ledger, cleaned up on drop.
    ///
    /// Ideal for unit tests — no filesystem side effects, no cleanup.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let accounts = db.open_tree(ACCOUNTS_TREE)?;
        Ok(Self { db, accounts })
    }

    /// Inserts a new account row.
    ///
    /// Uniqueness is enforced with a compare-and-swap against an absent
    /// key, so two racing inserts of the same number cannot both succeed.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateCard`] if the card number is already on file.
    pub fn insert(&self, account: &Account) -> StoreResult<()> {
        let key = account.card_number.as_ref();
        let value = encode(account)?;

        self.accounts
            .compare_and_swap(key, None as Option<&[u8]>, Some(value))?
            .map_err(|_| StoreError::DuplicateCard(account.card_number.to_string()))?;

        self.db.flush()?;
        Ok(())
    }

    /// Fetches the account row for a card number, if present.
    pub fn get(&self, card: &CardNumber) -> StoreResult<Option<Account>> {
        match self.accounts.get(card)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Returns `true` if the card number has a row in the ledger.
    pub fn contains(&self, card: &CardNumber) -> StoreResult<bool> {
        Ok(self.accounts.contains_key(card)?)
    }

    /// Returns every card number on file.
    ///
    /// Used for membership-style checks and operator tooling; callers
    /// must not rely on ordering.
    pub fn card_numbers(&self) -> StoreResult<Vec<CardNumber>> {
        let mut numbers = Vec::with_capacity(self.accounts.len());
        for row in self.accounts.iter() {
            let (_, value) = row?;
            numbers.push(decode(&value)?.card_number);
        }
        Ok(numbers)
    }

    /// Applies a signed delta to one account's balance and returns the
    /// new balance.
    ///
    /// The read-modify-write runs inside a sled transaction, so
    /// concurrent adjustments to the same row cannot lose updates. The
    /// delta may be negative and the result may go negative — sufficiency
    /// is the transfer protocol's responsibility, not the ledger's.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the row is absent,
    /// [`StoreError::BalanceOverflow`] if the arithmetic overflows i64.
    pub fn adjust_balance(&self, card: &CardNumber, delta: i64) -> StoreResult<i64> {
        let key = card.as_ref();
        let result = self.accounts.transaction(|tx| {
            let bytes = tx
                .get(key)?
                .ok_or_else(|| abort(StoreError::NotFound(card.to_string())))?;
            let mut account = decode(&bytes).map_err(abort)?;

            account.balance = account.balance.checked_add(delta).ok_or_else(|| {
                abort(StoreError::BalanceOverflow {
                    current: account.balance,
                    delta,
                })
            })?;

            tx.insert(key, encode(&account).map_err(abort)?)?;
            Ok(account.balance)
        });

        let balance = unwrap_transaction(result)?;
        self.db.flush()?;
        Ok(balance)
    }

    /// Moves `amount` from one row to another in a single atomic unit.
    ///
    /// Debit and credit commit together or not at all; a conflicting
    /// concurrent writer causes a transparent retry, never a partial
    /// state. The sufficiency check lives *inside* the transaction so a
    /// racing withdrawal cannot overdraw the sender between check and
    /// debit.
    ///
    /// A same-row move (`from == to`) is a structural no-op: the row must
    /// exist and the amount must be covered, but the balance is left
    /// untouched.
    ///
    /// Returns the post-transfer balances as `(sender, destination)`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if either row is absent,
    /// [`StoreError::InsufficientBalance`] if the sender cannot cover
    /// `amount`, [`StoreError::BalanceOverflow`] if the credit would
    /// overflow the destination.
    pub fn transfer_balances(
        &self,
        from: &CardNumber,
        to: &CardNumber,
        amount: i64,
    ) -> StoreResult<(i64, i64)> {
        debug_assert!(amount >= 0, "transfer amounts are non-negative");

        if from == to {
            // Reading one key twice inside the transaction would make the
            // second insert clobber the first; short-circuit instead.
            let account = self
                .get(from)?
                .ok_or_else(|| StoreError::NotFound(from.to_string()))?;
            if account.balance < amount {
                return Err(StoreError::InsufficientBalance {
                    available: account.balance,
                    requested: amount,
                });
            }
            return Ok((account.balance, account.balance));
        }

        let from_key = from.as_ref();
        let to_key = to.as_ref();
        let result = self.accounts.transaction(|tx| {
            let from_bytes = tx
                .get(from_key)?
                .ok_or_else(|| abort(StoreError::NotFound(from.to_string())))?;
            let to_bytes = tx
                .get(to_key)?
                .ok_or_else(|| abort(StoreError::NotFound(to.to_string())))?;

            let mut sender = decode(&from_bytes).map_err(abort)?;
            let mut destination = decode(&to_bytes).map_err(abort)?;

            if sender.balance < amount {
                return Err(abort(StoreError::InsufficientBalance {
                    available: sender.balance,
                    requested: amount,
                }));
            }

            sender.balance -= amount;
            destination.balance = destination.balance.checked_add(amount).ok_or_else(|| {
                abort(StoreError::BalanceOverflow {
                    current: destination.balance,
                    delta: amount,
                })
            })?;

            tx.insert(from_key, encode(&sender).map_err(abort)?)?;
            tx.insert(to_key, encode(&destination).map_err(abort)?)?;
            Ok((sender.balance, destination.balance))
        });

        let balances = unwrap_transaction(result)?;
        self.db.flush()?;
        Ok(balances)
    }

    /// Deletes an account row.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no row exists for the card number.
    pub fn remove(&self, card: &CardNumber) -> StoreResult<()> {
        if self.accounts.remove(card)?.is_none() {
            return Err(StoreError::NotFound(card.to_string()));
        }
        self.db.flush()?;
        Ok(())
    }

    /// Number of accounts on file.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// `true` if the ledger holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Wraps a [`StoreError`] for use inside a sled transaction closure.
fn abort(e: StoreError) -> ConflictableTransactionError<StoreError> {
    ConflictableTransactionError::Abort(e)
}

/// Collapses sled's two-layer transaction error into a [`StoreError`].
fn unwrap_transaction<T>(result: Result<T, TransactionError<StoreError>>) -> StoreResult<T> {
    result.map_err(|e| match e {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => StoreError::Sled(e),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
