//! Single-room TCP Chat Server Library
//!
//! A line-based chat service built on tokio using the Actor pattern for
//! state management. Every line a client types is relayed to every other
//! connected client.
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `Broadcaster` is the central actor owning the roster of users
//! - Each connection has a `handler` task, a writer task draining the
//!   user's mailbox, and an idle watchdog
//! - No locks needed - the only shared state is the id counter
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tcp_chat::{serve, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let listener = TcpListener::bind(&config.bind_addr).await.unwrap();
//!     serve(listener, config).await;
//! }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod listener;
pub mod message;
pub mod server;
pub mod types;
pub mod user;
pub mod watchdog;
pub mod writer;

// Re-export main types for convenience
pub use config::ServerConfig;
pub use error::{AppError, SendError};
pub use handler::{handle_connection, ChatContext};
pub use listener::serve;
pub use message::Message;
pub use server::{Broadcaster, BroadcasterHandle};
pub use types::{IdGenerator, UserId};
pub use user::{Mailbox, User};
pub use watchdog::{ActivitySignal, IdleWatchdog};
