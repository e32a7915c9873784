//! Terminal chat client.
//!
//! Asks for a display name, connects to the relay server and shows a
//! full-screen chat. Enter sends, Backspace deletes, ESC leaves.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client
//! cargo run --bin hiroba-client -- --name Alice --url ws://192.168.0.10:8765
//! cargo run --bin hiroba-client -- --log-file client.log
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use hiroba_client::{
    ClientConfig, MAX_MESSAGES, config::default_server_url, run_client,
};
use hiroba_shared::logger::setup_file_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "Terminal chat client for the Hiroba relay server", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value_t = default_server_url())]
    url: String,

    /// Display name; asked interactively when omitted
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Number of messages kept in the chat history
    #[arg(long, default_value_t = MAX_MESSAGES)]
    max_messages: usize,

    /// Longest wait for a key before the screen is redrawn, in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_interval_ms: u64,

    /// Write logs to this file (the terminal is taken by the chat screen)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log_file
        && let Err(e) = setup_file_logger(env!("CARGO_BIN_NAME"), "debug", path)
    {
        eprintln!("Failed to open log file {}: {}", path.display(), e);
        std::process::exit(1);
    }

    let config = ClientConfig {
        url: args.url,
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        max_messages: args.max_messages,
    };

    match run_client(config, args.name).await {
        Ok(()) => println!("Chat session ended."),
        Err(e) => {
            tracing::error!("Client error: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
