//! Command line configuration of the relay server.

use std::time::Duration;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "uketsuke-server", version, about = "Customer-support live chat relay")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3005)]
    pub port: u16,

    /// Quiet period after which a typing indicator stops on its own
    #[arg(long, default_value_t = 3000)]
    pub typing_timeout_ms: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn typing_timeout(&self) -> Duration {
        Duration::from_millis(self.typing_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3005,
            typing_timeout_ms: 3000,
            log_level: "debug".to_string(),
        }
    }
}
