//! Infrastructure layer: wire formats and the in-memory relay repository.

pub mod dto;
pub mod repository;
