//! Unified error types and result handling for the dispatch engine.
//!
//! The taxonomy follows the recovery policy: `Validation` is recovered close
//! to the handler (a module's error-boundary middleware turns it into an
//! ephemeral user-visible message), structural/contract failures
//! (`Resolution`, `AlreadyAcknowledged`, `NonLeafCommand`) are bugs that are
//! logged and abandoned, and anything else is caught at the dispatcher
//! boundary so one bad interaction can never take the process down.

use crate::command::CommandKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// User input or authorization failure. Surfaced to the invoking user as
    /// an ephemeral message, never logged as a system failure.
    #[error("{0}")]
    Validation(String),

    /// A second response-issuing call on an interaction that has already been
    /// acknowledged. Programmer error; the transport is never reached twice.
    #[error("interaction has already been acknowledged")]
    AlreadyAcknowledged,

    /// An edit or follow-up was attempted before any initial response.
    #[error("interaction has not been acknowledged yet")]
    NotAcknowledged,

    /// Malformed inbound payload, e.g. a resolved member with no matching
    /// user entry, or a required option the platform failed to supply.
    #[error("resolved data contract violation: {0}")]
    Resolution(String),

    /// A command with children was invoked directly, or a leaf was declared
    /// without a handler. Programmer error, never user-facing.
    #[error("command '{0}' is not directly executable")]
    NonLeafCommand(String),

    /// Tree resolution named a child that does not exist under the matched
    /// command.
    #[error("command '{command}' has no subcommand named '{name}'")]
    UnknownSubcommand { command: String, name: String },

    #[error("a {kind} command named '{name}' is already registered")]
    DuplicateCommand { name: String, kind: CommandKind },

    #[error("a module with id '{0}' is already registered")]
    DuplicateModule(String),

    #[error("module dependency cycle detected at '{0}'")]
    ModuleCycle(String),

    #[error("unknown interaction type code: {0}")]
    UnknownInteractionType(u8),

    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    /// Failure reported by the outbound response transport.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for an [`Error::Validation`] with an owned message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for an [`Error::Resolution`] with an owned message.
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }
}
