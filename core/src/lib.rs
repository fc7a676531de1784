// Copyright (c) 2026 Ferrocard Contributors. MIT License.
// See LICENSE for details.

//! # FERROCARD — Core Library
//!
//! The business end of a small card-issuing bank: 16-digit Luhn card
//! numbers, 4-digit PINs, balances in minor currency units, and transfers
//! between accounts — all persisted in an embedded sled database.
//!
//! ## Architecture
//!
//! The library is split into modules that mirror the actual concerns of a
//! card ledger:
//!
//! - **luhn** — The check-digit algorithm. Pure arithmetic, no I/O.
//! - **card** — Card number and PIN types: parsing, validation, generation.
//! - **store** — The account ledger. One sled tree, bincode rows, durable
//!   writes.
//! - **session** — Login state machine. Who is at the terminal right now.
//! - **transfer** — Destination validation and the atomic two-row move.
//! - **bank** — The facade the shell talks to: open, deposit, transfer,
//!   close.
//! - **config** — Every constant in one place.
//!
//! ## Design Philosophy
//!
//! 1. All amounts are integers in smallest-unit denomination. No floating
//!    point anywhere near a balance.
//! 2. A transfer either moves money on both rows or moves nothing. There
//!    is no code path that leaves the ledger total changed.
//! 3. If it touches money, it has tests. Plural.

pub mod bank;
pub mod card;
pub mod config;
pub mod luhn;
pub mod session;
pub mod store;
pub mod transfer;

pub use bank::{Bank, BankError};
pub use card::{CardNumber, CardParseError, Pin};
pub use session::{Session, SessionError};
pub use store::{Account, AccountStore, StoreError};
pub use transfer::{transfer, TransferError, TransferReceipt};
