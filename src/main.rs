//! Mist Online 2 Beauty Server
//!
//! A Rust implementation of the beauty-shop subsystem for the v1.4 client:
//! binary command decode, two-level opcode dispatch, equipment/wallet
//! mutation, and zone-scoped broadcast.

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod constants;
mod game;
mod handlers;
mod metadata;
mod npc;
mod protocol;

use config::ServerConfig;
use game::GameState;
use handlers::Dispatcher;
use metadata::MetadataStore;

/// Shared server state
pub struct Server {
    pub config: ServerConfig,
    pub metadata: MetadataStore,
    pub game_state: GameState,
    pub dispatcher: Dispatcher,
    next_character_id: AtomicI64,
}

impl Server {
    pub fn new(config: ServerConfig, metadata: MetadataStore) -> Self {
        Self {
            config,
            metadata,
            game_state: GameState::new(),
            dispatcher: Dispatcher::new(),
            next_character_id: AtomicI64::new(1),
        }
    }

    /// Get the next available character ID.
    pub fn next_character_id(&self) -> i64 {
        self.next_character_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total connection count.
    pub fn connection_count(&self) -> usize {
        self.game_state.session_count()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    // Default to INFO, override with RUST_LOG env var (e.g., RUST_LOG=debug or RUST_LOG=trace)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        "Starting Mist Online 2 beauty server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = match ServerConfig::load(Path::new("config.toml")) {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default configuration: {}", e);
            ServerConfig::default()
        }
    };

    // Load static game data
    let metadata = MetadataStore::load(Path::new(&config.game.data_dir))?;
    info!("Game data loaded from {}", config.game.data_dir);

    // Create server
    let server = Arc::new(Server::new(config, metadata));

    // Bind to address
    let addr = format!(
        "{}:{}",
        server.config.server.host, server.config.server.port
    );
    let listener = TcpListener::bind(&addr).await?;

    info!("Server listening on {}", addr);

    // Accept connections
    loop {
        match listener.accept().await {
            Ok((socket, addr)) => {
                let server = server.clone();

                // Check connection limits
                if server.connection_count() >= server.config.server.max_connections {
                    warn!("Connection limit reached, rejecting {}", addr);
                    continue;
                }

                // Spawn handler task
                tokio::spawn(async move {
                    if let Err(e) = handlers::handle_connection(socket, addr, server).await {
                        error!("Connection handler error for {}: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
