//! User struct definition
//!
//! Represents a connected user with their identity and outbound mailbox.

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::error::SendError;
use crate::types::UserId;

/// Receiving end of a [`Mailbox`], drained by the writer task
pub type MailboxReceiver = mpsc::Receiver<String>;

/// Bounded, ordered queue of outbound lines for one user
///
/// There is exactly one `Mailbox` per user. Whoever holds it may enqueue;
/// dropping it (see [`Mailbox::close`]) closes the queue, after which the
/// writer drains what is left and stops.
#[derive(Debug)]
pub struct Mailbox {
    sender: mpsc::Sender<String>,
}

impl Mailbox {
    /// Create a mailbox holding at most `capacity` pending lines
    pub fn channel(capacity: usize) -> (Self, MailboxReceiver) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Enqueue a line, waiting while the mailbox is full
    pub async fn deliver(&self, line: String) -> Result<(), SendError> {
        self.sender
            .send(line)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Close the mailbox
    ///
    /// Consumes the only sender, so closing twice or enqueueing
    /// afterwards cannot be expressed.
    pub fn close(self) {
        drop(self.sender);
    }
}

/// Connected user information
#[derive(Debug)]
pub struct User {
    /// Unique identifier for this user
    pub id: UserId,
    /// Remote address of the connection
    pub addr: String,
    /// When the connection was admitted
    pub joined_at: DateTime<Local>,
    /// Outbound lines for this user
    pub mailbox: Mailbox,
}

impl User {
    /// Create a new user admitted now
    pub fn new(id: UserId, addr: String, mailbox: Mailbox) -> Self {
        Self {
            id,
            addr,
            joined_at: Local::now(),
            mailbox,
        }
    }

    /// Self-addressed greeting sent before the user joins the roster
    pub fn welcome_line(&self) -> String {
        format!("Welcome, {}", self)
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, UID:{}, Enter At:{}",
            self.addr,
            self.id,
            self.joined_at.format("%Y-%m-%d %H:%M:%S%:z")
        )
    }
}
