//! Broadcaster Actor implementation
//!
//! The central actor that owns the roster of connected users.
//! Uses the Actor pattern with mpsc channels for message passing: join,
//! leave and chat traffic arrive on three separate queues and are
//! processed one event at a time, so the roster needs no lock.

use std::collections::BTreeMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::Message;
use crate::types::UserId;
use crate::user::User;

/// Join and leave submissions wait for acknowledgement, so one slot is enough
const PRESENCE_QUEUE_CAPACITY: usize = 1;

/// A user entering the roster
#[derive(Debug)]
pub struct Join {
    pub user: User,
    ack: oneshot::Sender<()>,
}

/// A user leaving the roster
#[derive(Debug)]
pub struct Leave {
    pub user_id: UserId,
    ack: oneshot::Sender<()>,
}

/// Sending side of the broadcaster's three event sources
///
/// Cheap to clone; one copy per connection.
#[derive(Debug, Clone)]
pub struct BroadcasterHandle {
    joins: mpsc::Sender<Join>,
    leaves: mpsc::Sender<Leave>,
    messages: mpsc::Sender<Message>,
}

impl BroadcasterHandle {
    /// Hand `user` (and its mailbox) to the roster
    ///
    /// Returns once the broadcaster has inserted the user.
    pub async fn join(&self, user: User) -> Result<(), AppError> {
        let (ack, done) = oneshot::channel();
        self.joins
            .send(Join { user, ack })
            .await
            .map_err(|_| AppError::ChannelSend)?;
        done.await.map_err(|_| AppError::ChannelSend)
    }

    /// Remove a user from the roster and close their mailbox
    ///
    /// Returns once the broadcaster has done both.
    pub async fn leave(&self, user_id: UserId) -> Result<(), AppError> {
        let (ack, done) = oneshot::channel();
        self.leaves
            .send(Leave { user_id, ack })
            .await
            .map_err(|_| AppError::ChannelSend)?;
        done.await.map_err(|_| AppError::ChannelSend)
    }

    /// Queue a message for fan-out, waiting while the queue is full
    pub async fn publish(&self, msg: Message) -> Result<(), AppError> {
        self.messages
            .send(msg)
            .await
            .map_err(|_| AppError::ChannelSend)
    }
}

/// The broadcaster actor
///
/// Roster membership is exactly the users whose join has been processed
/// and whose leave has not. Keyed by id, so fan-out visits users in
/// arrival order.
pub struct Broadcaster {
    roster: BTreeMap<UserId, User>,
    joins: mpsc::Receiver<Join>,
    leaves: mpsc::Receiver<Leave>,
    messages: mpsc::Receiver<Message>,
}

impl Broadcaster {
    /// Create a broadcaster and the handle feeding it
    pub fn new(message_queue_capacity: usize) -> (Self, BroadcasterHandle) {
        let (join_tx, joins) = mpsc::channel(PRESENCE_QUEUE_CAPACITY);
        let (leave_tx, leaves) = mpsc::channel(PRESENCE_QUEUE_CAPACITY);
        let (message_tx, messages) = mpsc::channel(message_queue_capacity);

        let server = Self {
            roster: BTreeMap::new(),
            joins,
            leaves,
            messages,
        };
        let handle = BroadcasterHandle {
            joins: join_tx,
            leaves: leave_tx,
            messages: message_tx,
        };
        (server, handle)
    }

    /// Run the broadcaster event loop
    ///
    /// Whichever source is ready is served next; when several are, the
    /// choice is random. Ends once every handle has been dropped.
    pub async fn run(mut self) {
        info!("Broadcaster started");

        loop {
            tokio::select! {
                Some(Join { user, ack }) = self.joins.recv() => {
                    self.handle_join(user);
                    let _ = ack.send(());
                }
                Some(Leave { user_id, ack }) = self.leaves.recv() => {
                    self.handle_leave(user_id);
                    let _ = ack.send(());
                }
                Some(msg) = self.messages.recv() => {
                    self.handle_message(msg).await;
                }
                else => break,
            }
        }

        info!("Broadcaster shutting down");
    }

    fn handle_join(&mut self, user: User) {
        let user_id = user.id;
        if let Some(previous) = self.roster.insert(user_id, user) {
            error!("User {} joined twice, replacing stale entry", user_id);
            previous.mailbox.close();
        }
        debug!("User {} joined, roster size: {}", user_id, self.roster.len());
    }

    /// Remove first, then close: the roster never targets a closed mailbox
    fn handle_leave(&mut self, user_id: UserId) {
        let Some(user) = self.roster.remove(&user_id) else {
            warn!("Leave for unknown user {}", user_id);
            return;
        };

        user.mailbox.close();
        debug!("User {} left, roster size: {}", user_id, self.roster.len());
    }

    /// Deliver to everyone but the owner
    ///
    /// Each enqueue waits for space, so one full mailbox holds up the
    /// rest of this pass.
    async fn handle_message(&mut self, msg: Message) {
        for (user_id, user) in &self.roster {
            if *user_id == msg.owner {
                continue;
            }

            if let Err(e) = user.mailbox.deliver(msg.content.clone()).await {
                error!("Delivery to user {} failed: {}", user_id, e);
            }
        }
    }

    #[cfg(test)]
    fn roster_ids(&self) -> Vec<UserId> {
        self.roster.keys().copied().collect()
    }
}
