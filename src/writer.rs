//! Writer task
//!
//! Drains one user's mailbox onto the outbound half of their connection.

use futures_util::SinkExt;
use tokio::io::AsyncWrite;
use tokio_util::codec::{FramedWrite, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::UserId;
use crate::user::MailboxReceiver;

/// Write every mailbox line, in order, until the mailbox is closed
///
/// A write failure or a closed connection drops the outbound half, but
/// the mailbox is still drained until it closes so that nobody
/// enqueueing into it ever waits on a dead socket.
pub async fn run<W>(
    user_id: UserId,
    mut mailbox: MailboxReceiver,
    sink: FramedWrite<W, LinesCodec>,
    closed: CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    let mut sink = Some(sink);

    while let Some(line) = mailbox.recv().await {
        let Some(out) = sink.as_mut() else {
            continue;
        };

        let dead = tokio::select! {
            result = out.send(line) => match result {
                Ok(()) => false,
                Err(e) => {
                    debug!("Write to user {} failed: {}", user_id, e);
                    true
                }
            },
            _ = closed.cancelled() => {
                debug!("Connection of user {} closed, discarding output", user_id);
                true
            }
        };

        if dead {
            sink = None;
        }
    }

    if let Some(mut out) = sink {
        let _ = SinkExt::<String>::close(&mut out).await;
    }

    debug!("Write task ended for user {}", user_id);
}
