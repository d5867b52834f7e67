//! Line-based TCP Chat Server - Entry Point
//!
//! Binds the listener and serves chat connections.

use std::env;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tcp_chat::{serve, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=tcp_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tcp_chat=info")),
        )
        .init();

    // Get bind address from command line or use default
    let config = match env::args().nth(1) {
        Some(addr) => ServerConfig::with_addr(addr),
        None => ServerConfig::default(),
    };

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Chat server listening on {}", config.bind_addr);

    serve(listener, config).await;
    Ok(())
}
