//! kvlink CLI Client
//!
//! Command-line interface for issuing single commands.

use clap::{Parser, Subcommand};
use kvlink::{Client, Config, ResponseValue};
use tracing_subscriber::{fmt, EnvFilter};

/// kvlink CLI
#[derive(Parser, Debug)]
#[command(name = "kvlink-cli")]
#[command(about = "CLI for line-protocol key-value stores")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "6379")]
    port: u16,

    /// Read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ping the server
    Ping,

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Show the type of the value stored at a key
    Type {
        /// The key to inspect
        key: String,
    },

    /// Get several keys at once
    Mget {
        /// The keys to get
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Show server information
    Info,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,kvlink=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let mut client = match Client::connect(&config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", config.addr(), e);
            std::process::exit(1);
        }
    };

    let result = match &args.command {
        Commands::Ping => client.ping(),
        Commands::Get { key } => client.get(key),
        Commands::Set { key, value } => client.set(key, value),
        Commands::Del { key } => client.del(key),
        Commands::Type { key } => client.type_of(key),
        Commands::Mget { keys } => client.mget(keys),
        Commands::Info => client.info(),
    };

    match result {
        Ok(value @ ResponseValue::Error(_)) => {
            println!("{}", value);
            std::process::exit(2);
        }
        Ok(value) => println!("{}", value),
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            std::process::exit(1);
        }
    }
}
