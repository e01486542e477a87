//! WebSocket relay server and its HTTP endpoints.

mod handler;
mod runner;
mod signal;
pub mod state; // Infrastructure 層からアクセスするため public

pub use runner::{build_router, run, serve};
pub use state::AppState;
