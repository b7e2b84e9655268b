//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation and the weighted selector. Services consume repository traits
//! and provide a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::split_service::SplitService`] - Split registry and destination selection
//! - [`services::click_recorder::ClickRecorder`] - Non-blocking click hand-off
//! - [`services::stats_service::StatsService`] - Per-destination click statistics

pub mod services;
