//! Terminal I/O utilities for CLI.
//!
//! Provides TTY detection and user prompting.

use std::io::{self, BufRead, IsTerminal, Write};

use addon_release::Error;

pub fn prompt(message: &str) -> addon_release::Result<String> {
    if !io::stdin().is_terminal() {
        return Err(Error::validation_invalid_argument(
            "stdin",
            "Cannot prompt for input when stdin is not a terminal",
            None,
            None,
        ));
    }

    eprint!("{}", message);
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| Error::internal_io(e.to_string(), Some("read stdin".to_string())))?;

    Ok(line.trim().to_string())
}

pub fn prompt_password(message: &str) -> addon_release::Result<String> {
    prompt(message)
}

/// Print status message to stderr if running in a terminal.
pub fn status(message: &str) {
    if io::stderr().is_terminal() {
        eprintln!("{}", message);
    }
}

// log_status! macro is defined in lib.rs (#[macro_export]) and available crate-wide.
