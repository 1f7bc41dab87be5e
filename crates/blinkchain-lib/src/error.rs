//! Unified error type for the blinkchain-lib crate.
//!
//! [`BlinkchainError`] separates command-local failures (`Argument`, `Range`,
//! `Size`, `UnknownCommand`), which are reported to the client and leave the
//! session untouched, from fatal ones (`Transport`, `Io`, `Driver`, `Config`) that
//! end the process. `From` impls allow `?` to propagate across module
//! boundaries.

use std::fmt;

use crate::driver::DriverError;

/// Unified error type for blinkchain-lib operations.
#[derive(Debug)]
pub enum BlinkchainError {
    /// Malformed, missing or extra command arguments.
    Argument(String),
    /// Coordinates, offsets or channel numbers out of range.
    Range(String),
    /// Binary payload length does not match what the command requires.
    Size(String),
    /// Command name not recognised.
    UnknownCommand(String),
    /// End-of-stream in the middle of a command, or an oversized line.
    Transport(String),
    /// Read or write failure on the command stream.
    Io(std::io::Error),
    /// Strip driver init/render failure.
    Driver(DriverError),
    /// Startup configuration error.
    Config(String),
}

impl BlinkchainError {
    /// Whether this error must end the command loop.
    ///
    /// Command-local errors are answered with an `ERR:` reply and the
    /// dispatcher keeps reading.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BlinkchainError::Transport(_)
                | BlinkchainError::Io(_)
                | BlinkchainError::Driver(_)
                | BlinkchainError::Config(_)
        )
    }
}

impl fmt::Display for BlinkchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlinkchainError::Argument(e) => write!(f, "Argument error: {e}"),
            BlinkchainError::Range(e) => write!(f, "{e}"),
            BlinkchainError::Size(e) => write!(f, "{e}"),
            BlinkchainError::UnknownCommand(name) => write!(f, "Unrecognized command: '{name}'"),
            BlinkchainError::Transport(e) => write!(f, "Transport error: {e}"),
            BlinkchainError::Io(e) => write!(f, "Transport error: {e}"),
            BlinkchainError::Driver(e) => write!(f, "{e}"),
            BlinkchainError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for BlinkchainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlinkchainError::Driver(e) => Some(e),
            BlinkchainError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DriverError> for BlinkchainError {
    fn from(e: DriverError) -> Self {
        BlinkchainError::Driver(e)
    }
}

impl From<std::io::Error> for BlinkchainError {
    fn from(e: std::io::Error) -> Self {
        BlinkchainError::Io(e)
    }
}

/// Crate-level Result alias using [`BlinkchainError`].
pub type Result<T> = std::result::Result<T, BlinkchainError>;
