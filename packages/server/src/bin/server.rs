//! Customer-support live chat relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin uketsuke-server -- --port 3005
//! ```

use clap::Parser;
use uketsuke_server::ServerConfig;
use uketsuke_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = uketsuke_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
