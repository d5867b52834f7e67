//! Idle watchdog
//!
//! Closes a connection that has been silent for a full timeout period.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::types::UserId;

/// Reports activity to an [`IdleWatchdog`]
#[derive(Debug, Clone)]
pub struct ActivitySignal {
    tx: mpsc::Sender<()>,
}

impl ActivitySignal {
    /// Restart the idle countdown; never waits
    pub fn touch(&self) {
        // A full slot already holds a pending reset
        let _ = self.tx.try_send(());
    }
}

/// Per-connection inactivity timer
pub struct IdleWatchdog {
    user_id: UserId,
    timeout: Duration,
    activity: mpsc::Receiver<()>,
    closed: CancellationToken,
}

impl IdleWatchdog {
    /// Create a watchdog that cancels `closed` after `timeout` without activity
    pub fn new(
        user_id: UserId,
        timeout: Duration,
        closed: CancellationToken,
    ) -> (Self, ActivitySignal) {
        let (tx, activity) = mpsc::channel(1);
        let watchdog = Self {
            user_id,
            timeout,
            activity,
            closed,
        };
        (watchdog, ActivitySignal { tx })
    }

    /// Run until the timer expires or the connection goes away
    ///
    /// Returns `true` if this watchdog closed the connection.
    pub async fn run(mut self) -> bool {
        let deadline = time::sleep(self.timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                () = &mut deadline => {
                    info!("User {} idle for {:?}, closing connection", self.user_id, self.timeout);
                    self.closed.cancel();
                    return true;
                }
                signal = self.activity.recv() => match signal {
                    Some(()) => deadline.as_mut().reset(Instant::now() + self.timeout),
                    None => return false,
                },
                () = self.closed.cancelled() => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::task::yield_now;
    use tokio::time::{sleep, timeout};

    use super::*;

    const IDLE: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_timeout() {
        let closed = CancellationToken::new();
        let (watchdog, _signal) = IdleWatchdog::new(UserId(1), IDLE, closed.clone());
        let started = Instant::now();
        let task = tokio::spawn(watchdog.run());

        timeout(IDLE + Duration::from_secs(1), closed.cancelled())
            .await
            .expect("watchdog should close an idle connection");

        assert!(started.elapsed() >= IDLE);
        assert!(task.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_postpones_expiry() {
        let closed = CancellationToken::new();
        let (watchdog, signal) = IdleWatchdog::new(UserId(1), IDLE, closed.clone());
        let task = tokio::spawn(watchdog.run());

        for _ in 0..5 {
            sleep(Duration::from_secs(45)).await;
            signal.touch();
            yield_now().await;
        }
        assert!(!closed.is_cancelled());

        let last_touch = Instant::now();
        timeout(IDLE + Duration::from_secs(1), closed.cancelled())
            .await
            .expect("watchdog should expire once activity stops");
        assert!(last_touch.elapsed() >= IDLE);
        assert!(task.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_connection_closes() {
        let closed = CancellationToken::new();
        let (watchdog, _signal) = IdleWatchdog::new(UserId(1), IDLE, closed.clone());
        let task = tokio::spawn(watchdog.run());

        sleep(Duration::from_secs(10)).await;
        closed.cancel();

        assert!(!task.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_signal_dropped() {
        let closed = CancellationToken::new();
        let (watchdog, signal) = IdleWatchdog::new(UserId(1), IDLE, closed.clone());
        let task = tokio::spawn(watchdog.run());

        drop(signal);

        assert!(!task.await.unwrap());
        assert!(!closed.is_cancelled());
    }

    #[test]
    fn test_touch_never_blocks() {
        let closed = CancellationToken::new();
        let (_watchdog, signal) = IdleWatchdog::new(UserId(1), IDLE, closed);

        signal.touch();
        signal.touch();
        signal.touch();
    }
}
