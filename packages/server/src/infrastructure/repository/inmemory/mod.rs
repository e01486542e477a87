//! In-memory repository implementations.

pub mod relay;

pub use relay::InMemoryRelayRepository;
