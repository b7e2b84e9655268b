//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries against the schema in `migrations/`.
//!
//! # Repositories
//!
//! - [`PgSplitRepository`] - Splits and their ordered destination lists
//! - [`PgClickRepository`] - Click event log and click counters

pub mod pg_click_repository;
pub mod pg_split_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_split_repository::PgSplitRepository;
