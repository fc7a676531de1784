//! # Session & Authentication
//!
//! A [`Session`] tracks who is at the terminal: nobody (`LoggedOut`) or
//! exactly one authenticated card (`LoggedIn`). It is ephemeral state —
//! never persisted, reset at process start, cleared on logout and on
//! account closure.
//!
//! ## One error to rule out enumeration
//!
//! Login failure is always [`SessionError::InvalidCredentials`], whether
//! the card number was malformed, unknown, or the PIN was wrong. Telling
//! a caller *which* half of the credential failed would let them confirm
//! valid card numbers one probe at a time. This is intentional, not an
//! accident of shared error plumbing.

use thiserror::Error;
use tracing::{debug, info};

use crate::card::CardNumber;
use crate::store::{AccountStore, StoreError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Wrong card number or wrong PIN — deliberately indistinguishable.
    #[error("wrong card number or PIN")]
    InvalidCredentials,

    /// The operation requires an authenticated session.
    #[error("no account is logged in")]
    NotLoggedIn,

    /// The ledger failed underneath us.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The authentication state machine: `LoggedOut` or `LoggedIn(card)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    /// Nobody is authenticated. The starting state.
    #[default]
    LoggedOut,
    /// One card is authenticated for the duration of the session.
    LoggedIn(CardNumber),
}

impl Session {
    /// Creates a session in the `LoggedOut` state.
    pub fn new() -> Self {
        Self::LoggedOut
    }

    /// `true` if a card is currently authenticated.
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }

    /// The authenticated card, if any.
    pub fn current_card(&self) -> Option<&CardNumber> {
        match self {
            Self::LoggedIn(card) => Some(card),
            Self::LoggedOut => None,
        }
    }

    /// Attempts to authenticate with a raw card number and PIN.
    ///
    /// The card number must parse, the row must exist, and the PIN must
    /// match — any miss yields the same [`SessionError::InvalidCredentials`]
    /// and leaves the session `LoggedOut`. Only store I/O failures are
    /// reported distinctly.
    pub fn login(
        &mut self,
        store: &AccountStore,
        card_number: &str,
        pin: &str,
    ) -> Result<(), SessionError> {
        let card = match CardNumber::parse(card_number) {
            Ok(card) => card,
            Err(_) => {
                debug!("login rejected: malformed card number");
                return Err(SessionError::InvalidCredentials);
            }
        };

        let account = store
            .get(&card)?
            .ok_or(SessionError::InvalidCredentials)?;

        if !account.pin.matches(pin) {
            debug!(card = %card, "login rejected: PIN mismatch");
            return Err(SessionError::InvalidCredentials);
        }

        info!(card = %card, "login successful");
        *self = Self::LoggedIn(card);
        Ok(())
    }

    /// Transitions to `LoggedOut` unconditionally.
    pub fn logout(&mut self) {
        if let Self::LoggedIn(card) = &*self {
            info!(card = %card, "logged out");
        }
        *self = Self::LoggedOut;
    }

    /// Closes the authenticated account: deletes its row from the ledger
    /// and logs the session out. Returns the closed card number.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotLoggedIn`] outside of `LoggedIn`;
    /// [`StoreError::NotFound`] (wrapped) if the row vanished underneath
    /// the session — in that case the session still ends, since the
    /// account it referenced no longer exists.
    pub fn close_current_account(
        &mut self,
        store: &AccountStore,
    ) -> Result<CardNumber, SessionError> {
        let card = match &*self {
            Self::LoggedIn(card) => card.clone(),
            Self::LoggedOut => return Err(SessionError::NotLoggedIn),
        };

        let removed = store.remove(&card);
        *self = Self::LoggedOut;
        removed?;

        info!(card = %card, "account closed");
        Ok(card)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Pin;
    use crate::store::Account;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_store() -> (AccountStore, Account) {
        let mut rng = StdRng::seed_from_u64(99);
        let account = Account::new(CardNumber::generate(&mut rng), Pin::generate(&mut rng));
        let store = AccountStore::open_temporary().expect("temp store");
        store.insert(&account).expect("insert");
        (store, account)
    }

    #[test]
    fn login_with_correct_credentials_succeeds() {
        let (store, account) = seeded_store();
        let mut session = Session::new();

        session
            .login(&store, account.card_number.as_str(), account.pin.as_str())
            .unwrap();

        assert!(session.is_logged_in());
        assert_eq!(session.current_card(), Some(&account.card_number));
    }

    #[test]
    fn login_with_wrong_pin_fails_identically_to_unknown_card() {
        let (store, account) = seeded_store();
        let mut session = Session::new();

        let wrong_pin = if account.pin.as_str() == "0000" { "0001" } else { "0000" };
        let wrong_pin_err = session
            .login(&store, account.card_number.as_str(), wrong_pin)
            .unwrap_err();
        assert!(matches!(wrong_pin_err, SessionError::InvalidCredentials));
        assert!(!session.is_logged_in());

        // A well-formed card number that is not on file must produce the
        // exact same error.
        let mut rng = StdRng::seed_from_u64(1234);
        let unknown = CardNumber::generate(&mut rng);
        let unknown_err = session
            .login(&store, unknown.as_str(), account.pin.as_str())
            .unwrap_err();
        assert!(matches!(unknown_err, SessionError::InvalidCredentials));
        assert!(!session.is_logged_in());
    }

    #[test]
    fn login_with_malformed_card_number_fails_the_same_way() {
        let (store, account) = seeded_store();
        let mut session = Session::new();

        let err = session
            .login(&store, "not-a-card-number", account.pin.as_str())
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
        assert_eq!(session, Session::LoggedOut);
    }

    #[test]
    fn logout_clears_the_session() {
        let (store, account) = seeded_store();
        let mut session = Session::new();
        session
            .login(&store, account.card_number.as_str(), account.pin.as_str())
            .unwrap();

        session.logout();
        assert_eq!(session, Session::LoggedOut);
        assert_eq!(session.current_card(), None);

        // Logout in LoggedOut is a harmless no-op.
        session.logout();
        assert_eq!(session, Session::LoggedOut);
    }

    #[test]
    fn close_current_account_removes_row_and_logs_out() {
        let (store, account) = seeded_store();
        let mut session = Session::new();
        session
            .login(&store, account.card_number.as_str(), account.pin.as_str())
            .unwrap();

        let closed = session.close_current_account(&store).unwrap();
        assert_eq!(closed, account.card_number);
        assert_eq!(session, Session::LoggedOut);
        assert_eq!(store.get(&account.card_number).unwrap(), None);
    }

    #[test]
    fn close_requires_a_logged_in_session() {
        let (store, _) = seeded_store();
        let mut session = Session::new();

        let err = session.close_current_account(&store).unwrap_err();
        assert!(matches!(err, SessionError::NotLoggedIn));
    }

    #[test]
    fn close_when_row_already_gone_still_ends_the_session() {
        let (store, account) = seeded_store();
        let mut session = Session::new();
        session
            .login(&store, account.card_number.as_str(), account.pin.as_str())
            .unwrap();

        // Simulate a race with deletion.
        store.remove(&account.card_number).unwrap();

        let err = session.close_current_account(&store).unwrap_err();
        assert!(matches!(err, SessionError::Store(StoreError::NotFound(_))));
        assert_eq!(session, Session::LoggedOut);
    }
}
