//! Accept loop
//!
//! Starts the Broadcaster and hands every accepted socket to its own
//! connection handler task.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::handler::{handle_connection, ChatContext};
use crate::server::Broadcaster;
use crate::types::IdGenerator;

/// Serve chat connections on `listener` forever
///
/// Accept failures are logged and do not stop the loop.
pub async fn serve(listener: TcpListener, config: ServerConfig) {
    let (broadcaster, handle) = Broadcaster::new(config.message_queue_capacity);
    tokio::spawn(broadcaster.run());
    info!("Broadcaster actor started");

    let ctx = ChatContext {
        ids: Arc::new(IdGenerator::new()),
        broadcaster: handle,
        config: Arc::new(config),
    };

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let ctx = ctx.clone();

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, ctx).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
