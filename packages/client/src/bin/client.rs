//! Interactive chat client for customers and agents.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin uketsuke-client -- --role agent --id agent-dave --name Dave
//! ```

use clap::Parser;
use uketsuke_client::ClientConfig;
use uketsuke_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ClientConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    if let Err(e) = uketsuke_client::run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
