//! Message definitions
//!
//! Plain-text line protocol: every outbound line is built here so the
//! wire formats live in one place.

use crate::types::UserId;

/// A line in transit through the broadcaster
///
/// Delivered to every user in the roster except `owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// User the message originates from (never receives it)
    pub owner: UserId,
    /// Fully formatted outbound line
    pub content: String,
}

impl Message {
    /// Chat line typed by `owner`: `<id>:<text>`
    pub fn chat(owner: UserId, text: &str) -> Self {
        Self {
            owner,
            content: format!("{}:{}", owner, text),
        }
    }

    /// System line announcing that `owner` arrived
    pub fn arrival(owner: UserId) -> Self {
        Self {
            owner,
            content: format!("user:`{}` has entered", owner),
        }
    }

    /// System line announcing that `owner` left
    pub fn departure(owner: UserId) -> Self {
        Self {
            owner,
            content: format!("user:`{}` has left", owner),
        }
    }
}
