//! Embercask CLI Client
//!
//! Command-line interface for interacting with an embercask server.

use clap::{Parser, Subcommand};
use serde_json::Value;

use embercask::network::Client;
use embercask::Result;

/// Embercask CLI
#[derive(Parser, Debug)]
#[command(name = "embercask-cli")]
#[command(about = "CLI for the embercask key-value store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8091")]
    server: String,

    /// Username, when the server requires authentication
    #[arg(short, long)]
    username: Option<String>,

    /// Password, when the server requires authentication
    #[arg(short, long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key to a value
    Set {
        /// The key to set
        key: String,

        /// The value to set (parsed as JSON, else stored as a string)
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut client = Client::connect(&args.server)?;

    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        client.authenticate(username, password)?;
    }

    match args.command {
        Commands::Get { key } => match client.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(nil)"),
        },
        Commands::Set { key, value } => {
            // `5` and `{"a":1}` store as JSON; anything unparsable stores
            // as a plain string
            let value: Value =
                serde_json::from_str(&value).unwrap_or_else(|_| Value::String(value));
            client.set(&key, value)?;
            println!("OK");
        }
        Commands::Del { key } => {
            client.delete(&key)?;
            println!("OK");
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}
