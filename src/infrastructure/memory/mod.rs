//! In-memory repository implementations for development and tests.

pub mod store;

pub use store::InMemoryStore;
