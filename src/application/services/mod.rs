//! Business logic services for the application layer.

pub mod click_recorder;
pub mod split_service;
pub mod stats_service;

pub use click_recorder::ClickRecorder;
pub use split_service::SplitService;
pub use stats_service::StatsService;
