//! Terminal client for the emoji chat.
//!
//! Connects to `{ws|wss}://{host}/websocket/emoji-chat`, derived from the
//! page origin, and keeps the connection alive with a heartbeat.
//! Unexpected disconnects are retried with exponential backoff; after too
//! many failures, `/retry` reconnects manually.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin emoji-chat -- --origin https://example.org
//! cargo run --bin emoji-chat -- -o http://127.0.0.1:8888 --lang ja
//! ```

use clap::Parser;

use emoji_chat_client::{ClientConfig, config::Lang, error::ClientError};
use emoji_chat_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "emoji-chat")]
#[command(about = "Reconnecting terminal client for the emoji chat", long_about = None)]
struct Args {
    /// Origin of the page hosting the chat (http or https)
    #[arg(short = 'o', long, default_value = "http://127.0.0.1:8888")]
    origin: String,

    /// Language of status and notice texts
    #[arg(short = 'l', long, value_enum, ignore_case = true, default_value_t = Lang::En)]
    lang: Lang,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ClientError> {
    let config = ClientConfig::new(&args.origin, args.lang)?;
    emoji_chat_client::run_client(config).await
}
