//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::{EnvFilter, fmt};

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the workspace crates log at
/// `default_level` and everything else at `warn`.
///
/// # Arguments
///
/// * `bin_name` - Binary name, used to label the startup log line
/// * `default_level` - Level for `uketsuke_*` targets when `RUST_LOG` is unset
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,uketsuke_server={default_level},uketsuke_client={default_level},\
             uketsuke_shared={default_level},tower_http={default_level}"
        ))
    });

    // A subscriber may already be installed (tests, embedding); keep it.
    if fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
    {
        tracing::debug!("Logger initialized for '{}'", bin_name);
    }
}
