//! TCP Chat Server - Entry Point
//!
//! Parses the optional port argument, binds the listener and serves.

use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tcp_chat::{AppError, ChatServer, ServerConfig};

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

    let config = match ServerConfig::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(AppError::Usage) => {
            println!("{}", AppError::Usage);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let server = ChatServer::bind(config).await?;
    info!("Listening on port: {}", server.local_addr()?.port());

    server.run().await;
    Ok(())
}
