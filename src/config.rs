//! Server configuration
//!
//! Fixed defaults for the chat service. Only the bind address can be
//! overridden, at process start.

use std::time::Duration;

/// Default listen address
pub const DEFAULT_ADDR: &str = "0.0.0.0:2020";

/// Inactivity period after which a connection is closed
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Pending outbound lines per user
pub const MAILBOX_CAPACITY: usize = 8;

/// Pending messages waiting for the broadcaster
pub const MESSAGE_QUEUE_CAPACITY: usize = 8;

/// Longest accepted inbound line, in bytes
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Runtime settings shared by the listener and every connection
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub idle_timeout: Duration,
    pub mailbox_capacity: usize,
    pub message_queue_capacity: usize,
    pub max_line_length: usize,
}

impl ServerConfig {
    /// Default settings listening on `bind_addr`
    pub fn with_addr(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            idle_timeout: IDLE_TIMEOUT,
            mailbox_capacity: MAILBOX_CAPACITY,
            message_queue_capacity: MESSAGE_QUEUE_CAPACITY,
            max_line_length: MAX_LINE_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:2020");
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.mailbox_capacity, 8);
        assert_eq!(config.message_queue_capacity, 8);
    }

    #[test]
    fn test_with_addr_keeps_defaults() {
        let config = ServerConfig::with_addr("127.0.0.1:9000");
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.idle_timeout, IDLE_TIMEOUT);
        assert_eq!(config.max_line_length, MAX_LINE_LENGTH);
    }
}
