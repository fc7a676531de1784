//! # Bank Facade
//!
//! [`Bank`] is the one type the shell talks to. It owns the ledger and
//! composes the lower modules into the operations a teller terminal
//! needs: open an account, check a balance, take a deposit, run a
//! transfer, close an account.
//!
//! ## Issuing & collisions
//!
//! Opening an account is generate-then-insert: draw a card number, try to
//! claim it, and on a [`StoreError::DuplicateCard`] roll again silently.
//! The retry loop is bounded by [`MAX_GENERATION_ATTEMPTS`] — with a
//! billion-slot keyspace the bound is practically unreachable, but an
//! unbounded loop over a broken RNG would spin forever, and we prefer a
//! loud error to a hung terminal.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::card::{CardNumber, Pin};
use crate::config::MAX_GENERATION_ATTEMPTS;
use crate::store::{Account, AccountStore, StoreError};
use crate::transfer::{self, TransferError, TransferReceipt};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error surface for [`Bank`] operations.
#[derive(Debug, Error)]
pub enum BankError {
    /// Card generation kept colliding until the attempt budget ran out.
    /// Practically unreachable; if you see this, audit the RNG.
    #[error("could not issue a unique card number after {attempts} attempts")]
    CardSpaceExhausted {
        /// How many attempts were made.
        attempts: u32,
    },

    /// A deposit (or other caller-supplied amount) was zero or negative.
    #[error("amount must be a positive number of minor units, got {0}")]
    InvalidAmount(i64),

    /// The card has no account on file.
    #[error("no account on file for card {0}")]
    UnknownCard(CardNumber),

    /// The ledger failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A transfer was rejected or failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

// ---------------------------------------------------------------------------
// Bank
// ---------------------------------------------------------------------------

/// The card-issuing bank: an [`AccountStore`] plus the operations the
/// menu shell exposes.
#[derive(Debug, Clone)]
pub struct Bank {
    store: AccountStore,
}

impl Bank {
    /// Opens (or creates) the bank's ledger at the given path.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, BankError> {
        Ok(Self {
            store: AccountStore::open(path)?,
        })
    }

    /// Creates a bank over a temporary in-memory ledger. For tests.
    pub fn open_temporary() -> Result<Self, BankError> {
        Ok(Self {
            store: AccountStore::open_temporary()?,
        })
    }

    /// The underlying ledger, for session and transfer calls.
    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Opens a new zero-balance account and returns its credentials.
    ///
    /// The card number and PIN are shown to the user exactly once, at
    /// creation — there is no recovery path, by design.
    pub fn open_account<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(CardNumber, Pin), BankError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let card = CardNumber::generate(rng);
            let pin = Pin::generate(rng);
            match self.store.insert(&Account::new(card.clone(), pin.clone())) {
                Ok(()) => {
                    info!(card = %card, attempt, "account opened");
                    return Ok((card, pin));
                }
                Err(StoreError::DuplicateCard(_)) => {
                    // The lottery came up: somebody already holds this
                    // number. Roll again without telling the user.
                    debug!(card = %card, attempt, "card number collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(BankError::CardSpaceExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Returns the current balance for a card.
    pub fn balance(&self, card: &CardNumber) -> Result<i64, BankError> {
        let account = self
            .store
            .get(card)?
            .ok_or_else(|| BankError::UnknownCard(card.clone()))?;
        Ok(account.balance)
    }

    /// Deposits a positive amount onto a card and returns the new balance.
    ///
    /// The amount gate lives here, at the caller-facing boundary — the
    /// ledger's `adjust_balance` deliberately accepts any delta.
    pub fn deposit(&self, card: &CardNumber, amount: i64) -> Result<i64, BankError> {
        if amount <= 0 {
            return Err(BankError::InvalidAmount(amount));
        }
        let new_balance = self.store.adjust_balance(card, amount).map_err(|e| match e {
            StoreError::NotFound(_) => BankError::UnknownCard(card.clone()),
            other => BankError::Store(other),
        })?;
        info!(card = %card, amount, new_balance, "deposit applied");
        Ok(new_balance)
    }

    /// Transfers `amount` from `sender` to the raw destination string.
    /// See [`crate::transfer::transfer`] for the validation pipeline.
    pub fn transfer(
        &self,
        sender: &CardNumber,
        destination: &str,
        amount: i64,
    ) -> Result<TransferReceipt, BankError> {
        Ok(transfer::transfer(&self.store, sender, destination, amount)?)
    }

    /// Closes an account, removing its row from the ledger.
    pub fn close(&self, card: &CardNumber) -> Result<(), BankError> {
        self.store.remove(card).map_err(|e| match e {
            StoreError::NotFound(_) => BankError::UnknownCard(card.clone()),
            other => BankError::Store(other),
        })?;
        info!(card = %card, "account closed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
