//! Utility functions shared across layers.
//!
//! - [`slug`] - Slug generation and validation
//! - [`url_normalizer`] - Destination URL validation and normalization
//! - [`client_ip`] - Requester address extraction

pub mod client_ip;
pub mod slug;
pub mod url_normalizer;
