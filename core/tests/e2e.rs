//! End-to-end integration tests for the FERROCARD core.
//!
//! These tests exercise the full account lifecycle the way the menu shell
//! drives it: open an account, log in with the issued credentials, deposit,
//! transfer, and close — proving that the modules compose correctly and
//! that every failure path leaves the ledger untouched.
//!
//! Each test stands alone with its own temporary ledger. No shared state,
//! no test ordering dependencies, no flaky failures.

use rand::rngs::StdRng;
use rand::SeedableRng;

use ferrocard::bank::{Bank, BankError};
use ferrocard::card::{CardNumber, Pin};
use ferrocard::luhn;
use ferrocard::session::{Session, SessionError};
use ferrocard::store::AccountStore;
use ferrocard::transfer::TransferError;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Opens a temporary bank and issues `n` accounts from a seeded RNG.
fn bank_with_accounts(seed: u64, n: usize) -> (Bank, Vec<(CardNumber, Pin)>) {
    let bank = Bank::open_temporary().expect("temp bank");
    let mut rng = StdRng::seed_from_u64(seed);
    let accounts = (0..n)
        .map(|_| bank.open_account(&mut rng).expect("open account"))
        .collect();
    (bank, accounts)
}

// ---------------------------------------------------------------------------
// 1. Full Account Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn full_account_lifecycle() {
    let (bank, accounts) = bank_with_accounts(1, 2);
    let (alice_card, alice_pin) = &accounts[0];
    let (bob_card, _) = &accounts[1];

    // Issued credentials are well-formed and distinct.
    assert!(luhn::is_valid_card_number(alice_card.as_str()));
    assert!(alice_card.as_str().starts_with("400000"));
    assert_ne!(alice_card, bob_card);

    // Log in with the issued credentials.
    let mut session = Session::new();
    session
        .login(bank.store(), alice_card.as_str(), alice_pin.as_str())
        .expect("login");
    assert_eq!(session.current_card(), Some(alice_card));

    // Fund Alice and move some of it to Bob.
    bank.deposit(alice_card, 10_000).unwrap();
    let receipt = bank.transfer(alice_card, bob_card.as_str(), 3_500).unwrap();
    assert_eq!(receipt.sender_balance_after, 6_500);
    assert_eq!(bank.balance(alice_card).unwrap(), 6_500);
    assert_eq!(bank.balance(bob_card).unwrap(), 3_500);

    // Close Alice's account through the session.
    session.close_current_account(bank.store()).unwrap();
    assert!(!session.is_logged_in());
    assert!(matches!(
        bank.balance(alice_card).unwrap_err(),
        BankError::UnknownCard(_)
    ));

    // Bob's money is unaffected by the closure.
    assert_eq!(bank.balance(bob_card).unwrap(), 3_500);
}

// ---------------------------------------------------------------------------
// 2. Authentication Behavior
// ---------------------------------------------------------------------------

#[test]
fn login_failures_are_uniform_and_stateless() {
    let (bank, accounts) = bank_with_accounts(2, 1);
    let (card, pin) = &accounts[0];
    let mut session = Session::new();

    let wrong_pin = if pin.as_str() == "1111" { "2222" } else { "1111" };

    // Wrong PIN, unknown card, and garbage input: identical error,
    // session stays logged out every time.
    let mut rng = StdRng::seed_from_u64(999);
    let unknown = CardNumber::generate(&mut rng);
    let attempts: [(&str, &str); 3] = [
        (card.as_str(), wrong_pin),
        (unknown.as_str(), pin.as_str()),
        ("0000111122223333", pin.as_str()),
    ];

    for (number, pin) in attempts {
        let err = session.login(bank.store(), number, pin).unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
        assert!(!session.is_logged_in());
    }

    // The real credentials still work afterwards.
    session.login(bank.store(), card.as_str(), pin.as_str()).unwrap();
    assert!(session.is_logged_in());
}

#[test]
fn logout_then_second_login_works() {
    let (bank, accounts) = bank_with_accounts(3, 2);
    let (first_card, first_pin) = &accounts[0];
    let (second_card, second_pin) = &accounts[1];
    let mut session = Session::new();

    session
        .login(bank.store(), first_card.as_str(), first_pin.as_str())
        .unwrap();
    session.logout();
    session
        .login(bank.store(), second_card.as_str(), second_pin.as_str())
        .unwrap();
    assert_eq!(session.current_card(), Some(second_card));
}

// ---------------------------------------------------------------------------
// 3. Transfer Edge Cases
// ---------------------------------------------------------------------------

#[test]
fn transfer_failures_never_move_money() {
    let (bank, accounts) = bank_with_accounts(4, 2);
    let (alice, _) = &accounts[0];
    let (bob, _) = &accounts[1];
    bank.deposit(alice, 500).unwrap();

    let mut rng = StdRng::seed_from_u64(4321);
    let ghost = CardNumber::generate(&mut rng);

    // Malformed destination.
    let err = bank.transfer(alice, "4000008449433400", 100).unwrap_err();
    assert!(matches!(
        err,
        BankError::Transfer(TransferError::MalformedCard(_))
    ));

    // Unknown destination.
    let err = bank.transfer(alice, ghost.as_str(), 100).unwrap_err();
    assert!(matches!(
        err,
        BankError::Transfer(TransferError::UnknownAccount(_))
    ));

    // Insufficient funds.
    let err = bank.transfer(alice, bob.as_str(), 501).unwrap_err();
    assert!(matches!(
        err,
        BankError::Transfer(TransferError::InsufficientFunds {
            available: 500,
            requested: 501,
        })
    ));

    // After three failures, not a single minor unit has moved.
    assert_eq!(bank.balance(alice).unwrap(), 500);
    assert_eq!(bank.balance(bob).unwrap(), 0);
}

#[test]
fn chained_transfers_conserve_the_system_total() {
    let (bank, accounts) = bank_with_accounts(5, 3);
    let (a, _) = &accounts[0];
    let (b, _) = &accounts[1];
    let (c, _) = &accounts[2];

    bank.deposit(a, 9_000).unwrap();
    bank.transfer(a, b.as_str(), 4_000).unwrap();
    bank.transfer(b, c.as_str(), 1_500).unwrap();
    bank.transfer(c, a.as_str(), 500).unwrap();

    let total = bank.balance(a).unwrap() + bank.balance(b).unwrap() + bank.balance(c).unwrap();
    assert_eq!(total, 9_000);
    assert_eq!(bank.balance(a).unwrap(), 5_500);
    assert_eq!(bank.balance(b).unwrap(), 2_500);
    assert_eq!(bank.balance(c).unwrap(), 1_000);
}

#[test]
fn self_transfer_preserves_balance() {
    let (bank, accounts) = bank_with_accounts(6, 1);
    let (card, _) = &accounts[0];
    bank.deposit(card, 800).unwrap();

    let receipt = bank.transfer(card, card.as_str(), 800).unwrap();
    assert!(receipt.self_transfer);
    assert_eq!(bank.balance(card).unwrap(), 800);
}

// ---------------------------------------------------------------------------
// 4. Persistence Across Restarts
// ---------------------------------------------------------------------------

#[test]
fn state_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut rng = StdRng::seed_from_u64(7);

    let (card, pin) = {
        let bank = Bank::open(dir.path()).unwrap();
        let (card, pin) = bank.open_account(&mut rng).unwrap();
        bank.deposit(&card, 2_750).unwrap();
        (card, pin)
    };

    // A fresh process: reopen the same data directory, log in, and find
    // the balance where we left it.
    let bank = Bank::open(dir.path()).unwrap();
    let mut session = Session::new();
    session
        .login(bank.store(), card.as_str(), pin.as_str())
        .expect("login after restart");
    assert_eq!(bank.balance(&card).unwrap(), 2_750);
}

#[test]
fn closed_accounts_stay_closed_after_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut rng = StdRng::seed_from_u64(8);

    let card = {
        let bank = Bank::open(dir.path()).unwrap();
        let (card, _) = bank.open_account(&mut rng).unwrap();
        bank.close(&card).unwrap();
        card
    };

    let store = AccountStore::open(dir.path()).unwrap();
    assert_eq!(store.get(&card).unwrap(), None);
    assert!(store.is_empty());
}
