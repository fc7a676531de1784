//! # Teller Menu Loop
//!
//! The interactive shell: two menus keyed off the session state, driven
//! by a single bounded loop. The shell owns no business logic — it reads
//! input, calls the core, and prints results; every balance decision is
//! made on the other side of the [`Bank`] API.
//!
//! The loop is explicit (no recursive re-invocation), so a marathon
//! teller session costs a constant amount of stack. End of input is
//! treated the same as choosing Exit.
//!
//! Reader, writer, and RNG are injected, which keeps the whole shell
//! scriptable from tests: feed it a `Cursor`, collect a `Vec<u8>`.

use std::io::{self, BufRead, Write};

use rand::RngCore;
use tracing::{error, warn};

use ferrocard::bank::{Bank, BankError};
use ferrocard::card::CardNumber;
use ferrocard::session::{Session, SessionError};
use ferrocard::transfer::TransferError;

/// What the dispatched menu round decided about the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Show the next menu.
    Continue,
    /// The user chose Exit (or the input ended).
    Exit,
}

// ---------------------------------------------------------------------------
// Shell
// ---------------------------------------------------------------------------

/// The menu-driven teller shell.
pub struct Shell<R, W> {
    bank: Bank,
    session: Session,
    reader: R,
    writer: W,
    rng: Box<dyn RngCore>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Builds a shell over the given bank and I/O endpoints, drawing
    /// card numbers and PINs from the thread-local RNG.
    pub fn new(bank: Bank, reader: R, writer: W) -> Self {
        Self::with_rng(bank, reader, writer, Box::new(rand::thread_rng()))
    }

    /// Like [`Shell::new`] but with an explicit RNG. Used by tests to
    /// make issued credentials reproducible.
    pub fn with_rng(bank: Bank, reader: R, writer: W, rng: Box<dyn RngCore>) -> Self {
        Self {
            bank,
            session: Session::new(),
            reader,
            writer,
            rng,
        }
    }

    /// Runs the menu loop until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            let flow = match self.session.current_card().cloned() {
                Some(card) => self.logged_in_round(&card)?,
                None => self.logged_out_round()?,
            };
            if flow == Flow::Exit {
                writeln!(self.writer, "\nBye!")?;
                return Ok(());
            }
        }
    }

    // -- Logged-out menu ----------------------------------------------------

    fn logged_out_round(&mut self) -> io::Result<Flow> {
        writeln!(self.writer, "\n1. Create an account\n2. Log into account\n0. Exit")?;
        let Some(choice) = self.read_line()? else {
            return Ok(Flow::Exit);
        };

        match choice.as_str() {
            "1" => self.create_account()?,
            "2" => self.log_in()?,
            "0" => return Ok(Flow::Exit),
            other => warn!(choice = other, "unrecognized menu choice"),
        }
        Ok(Flow::Continue)
    }

    fn create_account(&mut self) -> io::Result<()> {
        match self.bank.open_account(&mut *self.rng) {
            Ok((card, pin)) => {
                writeln!(self.writer, "\nYour card has been created")?;
                writeln!(self.writer, "Your card number:\n{card}")?;
                writeln!(self.writer, "Your card PIN:\n{pin}")?;
            }
            Err(e) => self.report_error(&e)?,
        }
        Ok(())
    }

    fn log_in(&mut self) -> io::Result<()> {
        writeln!(self.writer, "\nEnter your card number:")?;
        let Some(number) = self.read_line()? else {
            return Ok(());
        };
        writeln!(self.writer, "Enter your PIN:")?;
        let Some(pin) = self.read_line()? else {
            return Ok(());
        };

        match self.session.login(self.bank.store(), &number, &pin) {
            Ok(()) => writeln!(self.writer, "\nYou have successfully logged in!")?,
            Err(SessionError::InvalidCredentials) => {
                writeln!(self.writer, "\nWrong card number or PIN")?;
            }
            Err(e) => self.report_error(&e)?,
        }
        Ok(())
    }

    // -- Logged-in menu -----------------------------------------------------

    fn logged_in_round(&mut self, card: &CardNumber) -> io::Result<Flow> {
        writeln!(
            self.writer,
            "\n1. Balance\n2. Add income\n3. Do transfer\n4. Close account\n5. Log out\n0. Exit"
        )?;
        let Some(choice) = self.read_line()? else {
            return Ok(Flow::Exit);
        };

        match choice.as_str() {
            "1" => self.show_balance(card)?,
            "2" => self.add_income(card)?,
            "3" => self.do_transfer(card)?,
            "4" => self.close_account()?,
            "5" => {
                self.session.logout();
                writeln!(self.writer, "\nYou have successfully logged out!")?;
            }
            "0" => return Ok(Flow::Exit),
            other => warn!(choice = other, "unrecognized menu choice"),
        }
        Ok(Flow::Continue)
    }

    fn show_balance(&mut self, card: &CardNumber) -> io::Result<()> {
        match self.bank.balance(card) {
            Ok(balance) => writeln!(self.writer, "\nBalance: {balance}")?,
            Err(e) => self.report_error(&e)?,
        }
        Ok(())
    }

    fn add_income(&mut self, card: &CardNumber) -> io::Result<()> {
        writeln!(self.writer, "Enter income:")?;
        let Some(raw) = self.read_line()? else {
            return Ok(());
        };
        let Ok(amount) = raw.parse::<i64>() else {
            writeln!(self.writer, "Please enter a whole number of minor units.")?;
            return Ok(());
        };

        match self.bank.deposit(card, amount) {
            Ok(_) => writeln!(self.writer, "Income was added!")?,
            Err(BankError::InvalidAmount(_)) => {
                writeln!(self.writer, "Income must be a positive amount.")?;
            }
            Err(e) => self.report_error(&e)?,
        }
        Ok(())
    }

    fn do_transfer(&mut self, card: &CardNumber) -> io::Result<()> {
        writeln!(self.writer, "Transfer")?;
        writeln!(self.writer, "Enter card number:")?;
        let Some(destination) = self.read_line()? else {
            return Ok(());
        };

        // Validate the destination before bothering the user for an
        // amount; the core re-runs these checks atomically either way.
        match CardNumber::parse(&destination) {
            Err(_) => {
                writeln!(
                    self.writer,
                    "Probably you made a mistake in the card number. Please try again!"
                )?;
                return Ok(());
            }
            Ok(parsed) => match self.bank.store().contains(&parsed) {
                Ok(true) => {}
                Ok(false) => {
                    writeln!(self.writer, "Such a card does not exist.")?;
                    return Ok(());
                }
                Err(e) => return self.report_error(&e),
            },
        }

        writeln!(self.writer, "Enter how much money you want to transfer:")?;
        let Some(raw) = self.read_line()? else {
            return Ok(());
        };
        let Ok(amount) = raw.parse::<i64>() else {
            writeln!(self.writer, "Please enter a whole number of minor units.")?;
            return Ok(());
        };

        match self.bank.transfer(card, &destination, amount) {
            Ok(_) => writeln!(self.writer, "Success!")?,
            Err(BankError::Transfer(TransferError::MalformedCard(_))) => {
                writeln!(
                    self.writer,
                    "Probably you made a mistake in the card number. Please try again!"
                )?;
            }
            Err(BankError::Transfer(TransferError::UnknownAccount(_))) => {
                writeln!(self.writer, "Such a card does not exist.")?;
            }
            Err(BankError::Transfer(TransferError::InsufficientFunds { .. })) => {
                writeln!(self.writer, "Not enough money!")?;
            }
            Err(BankError::Transfer(TransferError::ZeroAmount)) => {
                writeln!(self.writer, "Transfer amount must be positive.")?;
            }
            Err(e) => self.report_error(&e)?,
        }
        Ok(())
    }

    fn close_account(&mut self) -> io::Result<()> {
        match self.session.close_current_account(self.bank.store()) {
            Ok(_) => writeln!(self.writer, "The account has been closed!")?,
            Err(e) => self.report_error(&e)?,
        }
        Ok(())
    }

    // -- Plumbing -----------------------------------------------------------

    /// Reads one trimmed line. `None` means end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    /// Reports a core failure to the user without ending the session.
    /// Store-level I/O errors are fatal to the current operation only.
    fn report_error(&mut self, e: &dyn std::error::Error) -> io::Result<()> {
        error!(error = %e, "operation failed");
        writeln!(self.writer, "Operation failed: {e}")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
