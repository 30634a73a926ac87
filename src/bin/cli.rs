//! SealKV CLI Client
//!
//! Command-line interface for interacting with SealKV.

use std::time::Duration;

use clap::{Parser, Subcommand};
use sealkv::{Client, ClientConfig, EncryptionKey, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// SealKV CLI
#[derive(Parser, Debug)]
#[command(name = "sealkv-cli")]
#[command(about = "CLI for SealKV key-value store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:4040")]
    server: String,

    /// Overall deadline for the request, retries included (milliseconds)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// Replace the value if the key already exists
        #[arg(long)]
        overwrite: bool,

        /// Print the previous value instead of the new one
        #[arg(long)]
        old: bool,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Check whether a key exists
    Exists {
        /// The key to check
        key: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let key = EncryptionKey::from_env()?;
    let config = ClientConfig::builder()
        .server_addr(args.server)
        .request_timeout(Duration::from_millis(args.timeout_ms))
        .build();

    let mut client = Client::connect(&config, &key)?;

    match args.command {
        Commands::Set {
            key,
            value,
            overwrite,
            old,
        } => {
            let returned = client.set(key.as_bytes(), value.as_bytes(), overwrite, old)?;
            print_value(Some(returned));
        }
        Commands::Get { key } => print_value(client.get(key.as_bytes())?),
        Commands::Del { key } => print_value(client.delete(key.as_bytes())?),
        Commands::Exists { key } => println!("{}", client.exists(key.as_bytes())?),
    }

    Ok(())
}

fn print_value(value: Option<Vec<u8>>) {
    match value {
        Some(value) => println!("{}", String::from_utf8_lossy(&value)),
        None => println!("(not found)"),
    }
}
