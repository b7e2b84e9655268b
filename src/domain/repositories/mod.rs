//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure`. Mock implementations are generated via `mockall`
//! for unit tests.
//!
//! - [`SplitRepository`] - split registry storage
//! - [`ClickRepository`] - click log and counters

pub mod click_repository;
pub mod split_repository;

pub use click_repository::{ClickRepository, ClickWindow};
pub use split_repository::SplitRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use split_repository::MockSplitRepository;
