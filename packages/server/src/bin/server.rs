//! Real-time collaboration server.
//!
//! Tracks connections per platform, keeps permissioned collaborative rooms and
//! relays room changes over WebSocket. External services push alerts and
//! notifications through the HTTP side-channel.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin agora-server
//! cargo run --bin agora-server -- --host 0.0.0.0 --port 3005 --log-level info
//! ```

use std::sync::Arc;

use agora_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRepository, InMemoryRoomRepository},
    },
    ui::{AppState, Server},
};
use agora_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "agora-server")]
#[command(about = "Real-time collaborative room server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3005")]
    port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(short = 'l', long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Registries
    // 2. MessagePusher
    // 3. UseCases (AppState)
    // 4. Server

    // 1. User Registry / Room Registry (in-memory)
    let connections = Arc::new(InMemoryConnectionRepository::new());
    let rooms = Arc::new(InMemoryRoomRepository::new());

    // 2. MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. UseCases
    let state = AppState::new(connections, rooms, message_pusher, Arc::new(SystemClock));

    // 4. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
