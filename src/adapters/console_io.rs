//! Operator input from the process stdin.

use std::io::{BufRead, Stdin};

use crate::app::ports::ConsoleInput;

/// Holds the `Stdin` handle, which is `Send`; the lock is taken per line so
/// the console can move onto its own task.
pub struct StdinConsole {
    stdin: Stdin,
}

impl StdinConsole {
    pub fn new() -> Self {
        Self {
            stdin: std::io::stdin(),
        }
    }
}

impl Default for StdinConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleInput for StdinConsole {
    fn read_line(&mut self) -> Option<String> {
        match self.stdin.lock().lines().next()? {
            Ok(line) => Some(line),
            Err(e) => {
                log::warn!("Console: stdin read failed: {}", e);
                None
            }
        }
    }
}
