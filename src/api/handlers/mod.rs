//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod redirect;
pub mod splits;
pub mod stats;

pub use health::health_handler;
pub use redirect::redirect_handler;
pub use splits::{
    create_split_handler, delete_split_handler, get_split_handler, list_splits_handler,
    update_split_handler,
};
pub use stats::split_stats_handler;
