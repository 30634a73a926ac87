//! SealKV Server Binary
//!
//! Starts the UDP server for SealKV.

use std::sync::Arc;

use clap::Parser;
use sealkv::config::port_from_env;
use sealkv::crypto::Cipher;
use sealkv::processor::Processor;
use sealkv::protocol::DEFAULT_PORT;
use sealkv::store::MemoryStore;
use sealkv::{Config, EncryptionKey, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// SealKV Server
#[derive(Parser, Debug)]
#[command(name = "sealkv-server")]
#[command(about = "Encrypted key-value store over UDP")]
#[command(version)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on (falls back to $PORT, then 4040)
    #[arg(short, long)]
    port: Option<u16>,

    /// Maximum concurrently running request handlers
    #[arg(short, long, default_value = "1000")]
    max_in_flight: usize,

    /// Socket read timeout in milliseconds (shutdown responsiveness)
    #[arg(long, default_value = "100")]
    read_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sealkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("SealKV Server v{}", sealkv::VERSION);

    let key = match EncryptionKey::from_env() {
        Ok(key) => key,
        Err(e) => {
            tracing::error!("Unable to load encryption key: {}", e);
            std::process::exit(1);
        }
    };

    // An explicit --port wins over $PORT
    let port = match port_from_env() {
        Ok(env_port) => args.port.or(env_port).unwrap_or(DEFAULT_PORT),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let config = Config::builder()
        .listen_addr(format!("{}:{}", args.host, port))
        .max_in_flight(args.max_in_flight)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Max in flight: {}", config.max_in_flight);

    let processor = Processor::new(Arc::new(MemoryStore::new()));

    let server = match Server::bind(config, Cipher::from_key(&key), processor) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("unable to start UDP Server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
