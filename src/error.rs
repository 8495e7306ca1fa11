//! Error types for the enigma library.

use thiserror::Error;

/// Errors produced while configuring or running a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnigmaError {
    /// The machine, a rotor, a permutation or an alphabet was described
    /// inconsistently (bad cycle text, unknown rotor name, wrong setting
    /// length, a misplaced reflector, ...).
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A symbol was looked up that is not part of the alphabet.
    #[error("symbol '{0}' is not in the alphabet")]
    UnknownSymbol(char),
}

impl EnigmaError {
    /// Shorthand for building a [`EnigmaError::Configuration`].
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        EnigmaError::Configuration(msg.into())
    }
}

/// Errors produced by the line-oriented [`Session`](crate::session::Session) driver.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The machine rejected a settings line or a message symbol.
    #[error(transparent)]
    Enigma(#[from] EnigmaError),
}
