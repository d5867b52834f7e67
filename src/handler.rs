//! TCP connection handler
//!
//! Handles individual client connections: admission, the welcome line,
//! announcing arrival and departure, forwarding typed lines to the
//! Broadcaster, and tearing everything down when the client goes away.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::codec::{AnyDelimiterCodec, FramedRead, FramedWrite, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::message::Message;
use crate::server::BroadcasterHandle;
use crate::types::{IdGenerator, UserId};
use crate::user::{Mailbox, User};
use crate::watchdog::{ActivitySignal, IdleWatchdog};
use crate::writer;

/// Inbound lines, split on `\n` without assuming UTF-8
type LineReader = FramedRead<OwnedReadHalf, AnyDelimiterCodec>;

/// Everything a connection needs from the rest of the server
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub ids: Arc<IdGenerator>,
    pub broadcaster: BroadcasterHandle,
    pub config: Arc<ServerConfig>,
}

/// Handle a new TCP connection
///
/// Admits the user, starts their writer and idle watchdog, and runs the
/// session until the client disconnects, a read fails, or the watchdog
/// closes the connection. Returns once the writer and watchdog are done.
pub async fn handle_connection(stream: TcpStream, ctx: ChatContext) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let user_id = ctx.ids.next_id()?;
    let (mailbox, mailbox_rx) = Mailbox::channel(ctx.config.mailbox_capacity);
    let user = User::new(user_id, peer_addr.clone(), mailbox);
    info!("User {} connected from {}", user_id, peer_addr);

    let (read_half, write_half) = stream.into_split();
    let closed = CancellationToken::new();

    let write_task = tokio::spawn(writer::run(
        user_id,
        mailbox_rx,
        FramedWrite::new(write_half, LinesCodec::new()),
        closed.clone(),
    ));

    let (watchdog, activity) =
        IdleWatchdog::new(user_id, ctx.config.idle_timeout, closed.clone());
    let watchdog_task = tokio::spawn(watchdog.run());

    let lines = FramedRead::new(
        read_half,
        AnyDelimiterCodec::new_with_max_length(
            b"\n".to_vec(),
            b"\n".to_vec(),
            ctx.config.max_line_length,
        ),
    );
    let result = run_session(user, lines, &ctx.broadcaster, activity, &closed).await;

    // Closing twice is harmless; the watchdog may already have done it
    closed.cancel();
    join_task(user_id, "Write task", write_task).await;
    join_task(user_id, "Idle watchdog", watchdog_task).await;

    info!("User {} disconnected", user_id);
    result
}

/// Welcome, announce, join, relay lines, then leave
async fn run_session(
    user: User,
    mut lines: LineReader,
    broadcaster: &BroadcasterHandle,
    activity: ActivitySignal,
    closed: &CancellationToken,
) -> Result<(), AppError> {
    let user_id = user.id;

    user.mailbox.deliver(user.welcome_line()).await?;
    broadcaster.publish(Message::arrival(user_id)).await?;

    // The mailbox moves into the roster; from here on only the
    // Broadcaster can enqueue for this user, and it alone closes it.
    broadcaster.join(user).await?;

    read_lines(user_id, &mut lines, broadcaster, &activity, closed).await?;

    broadcaster.leave(user_id).await?;
    broadcaster.publish(Message::departure(user_id)).await?;
    Ok(())
}

/// Forward each inbound line until EOF, a read error, or close
async fn read_lines(
    user_id: UserId,
    lines: &mut LineReader,
    broadcaster: &BroadcasterHandle,
    activity: &ActivitySignal,
    closed: &CancellationToken,
) -> Result<(), AppError> {
    loop {
        let next = tokio::select! {
            next = lines.next() => next,
            _ = closed.cancelled() => {
                debug!("Connection of user {} closed while reading", user_id);
                return Ok(());
            }
        };

        match next {
            Some(Ok(raw)) => {
                let text = decode_line(&raw);
                broadcaster.publish(Message::chat(user_id, &text)).await?;
                activity.touch();
            }
            Some(Err(e)) => {
                warn!("Read error for user {}: {}", user_id, e);
                return Ok(());
            }
            None => {
                debug!("User {} closed the connection", user_id);
                return Ok(());
            }
        }
    }
}

/// Wait for a per-connection task, logging a panic or cancellation
async fn join_task<T>(user_id: UserId, name: &str, task: JoinHandle<T>) -> Option<T> {
    match task.await {
        Ok(value) => Some(value),
        Err(e) => {
            error!("{} for user {} failed: {}", name, user_id, e);
            None
        }
    }
}

/// Drop a trailing `\r` and replace invalid UTF-8 rather than reject it
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
