//! # Transfer Protocol
//!
//! Moving money between two rows is the one operation in this system that
//! can go wrong in an interesting way, so it gets its own module and a
//! strict validation pipeline. Checks run in order and short-circuit on
//! the first failure, each with a distinct error:
//!
//! 1. The destination must be a well-formed card number (length, digits,
//!    Luhn check) — catches typos and foreign-issuer numbers locally.
//! 2. The destination must be on file in the ledger.
//! 3. A transfer to yourself is accepted as an explicit no-op rather than
//!    relying on debit and credit accidentally cancelling out.
//! 4. The sender must cover the amount — checked inside the same atomic
//!    unit that applies the debit and credit, so no interleaving can
//!    overdraw.
//!
//! Any failure leaves both balances exactly as they were; success moves
//! the amount and conserves the two-row total by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::card::{CardNumber, CardParseError};
use crate::store::{AccountStore, StoreError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while transferring funds.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The destination fails the format or checksum check. Almost always
    /// a typo; occasionally a card from somebody else's issuing system.
    #[error("malformed destination card number")]
    MalformedCard(#[from] CardParseError),

    /// The destination is well-formed but has no account on file.
    #[error("no such account: {0}")]
    UnknownAccount(CardNumber),

    /// The sender cannot cover the requested amount.
    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// The sender's balance at the time of the attempt.
        available: i64,
        /// The amount the transfer asked for.
        requested: i64,
    },

    /// The requested amount is zero or negative, which is a no-op and
    /// likely indicates a bug in the caller.
    #[error("transfer amount must be positive")]
    ZeroAmount,

    /// The ledger failed underneath the protocol.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Receipt
// ---------------------------------------------------------------------------

/// The record of a completed transfer, returned to the caller.
///
/// For a self-transfer `self_transfer` is `true` and no balance moved;
/// callers that care (the shell does not) can tell the two cases apart.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// The debited card.
    pub sender: CardNumber,
    /// The credited card.
    pub destination: CardNumber,
    /// Amount moved, in minor units.
    pub amount: i64,
    /// The sender's balance after the transfer.
    pub sender_balance_after: i64,
    /// `true` if sender and destination were the same account.
    pub self_transfer: bool,
    /// When the transfer completed.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

/// Transfers `amount` from `sender` to the account named by the raw
/// `destination` string.
///
/// See the module docs for the validation pipeline. On success both rows
/// have been committed durably; on any error neither row has changed.
pub fn transfer(
    store: &AccountStore,
    sender: &CardNumber,
    destination: &str,
    amount: i64,
) -> Result<TransferReceipt, TransferError> {
    if amount <= 0 {
        return Err(TransferError::ZeroAmount);
    }

    let destination = CardNumber::parse(destination)?;

    if !store.contains(&destination)? {
        return Err(TransferError::UnknownAccount(destination));
    }

    if destination == *sender {
        // Degenerate case: debit and credit would hit the same row.
        // Accept it, move nothing, report the current balance.
        let account = store
            .get(sender)?
            .ok_or_else(|| StoreError::NotFound(sender.to_string()))?;
        info!(card = %sender, amount, "self-transfer accepted as no-op");
        return Ok(TransferReceipt {
            sender: sender.clone(),
            destination,
            amount,
            sender_balance_after: account.balance,
            self_transfer: true,
            timestamp: Utc::now(),
        });
    }

    let (sender_balance_after, _) = store
        .transfer_balances(sender, &destination, amount)
        .map_err(|e| match e {
            StoreError::InsufficientBalance {
                available,
                requested,
            } => TransferError::InsufficientFunds {
                available,
                requested,
            },
            other => TransferError::Store(other),
        })?;

    info!(
        from = %sender,
        to = %destination,
        amount,
        "transfer completed"
    );

    Ok(TransferReceipt {
        sender: sender.clone(),
        destination,
        amount,
        sender_balance_after,
        self_transfer: false,
        timestamp: Utc::now(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
