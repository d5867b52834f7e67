//! Error types for the chat server
//!
//! Defines application-level errors and mailbox send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// All of these end the affected connection only; the accept loop
/// logs them and keeps serving everyone else.
#[derive(Debug, Error)]
pub enum AppError {
    /// Channel send error (fatal - the broadcaster is gone)
    #[error("Channel send error")]
    ChannelSend,

    /// Every user identifier has already been issued
    #[error("User identifiers exhausted")]
    IdsExhausted,

    /// Enqueue into a mailbox failed
    #[error("Mailbox error: {0}")]
    Mailbox(#[from] SendError),
}

/// Mailbox send errors
///
/// Occurs when attempting to enqueue into a mailbox whose writer is gone.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the mailbox has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
