//! Shared utilities for the Uketsuke relay and client.

pub mod logger;
pub mod time;
