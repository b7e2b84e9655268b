//! Rate limiting middleware using token bucket algorithm.

use anyhow::anyhow;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

pub type ApiRateLimitLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates a per-client rate limiter for the management API.
///
/// Tokens refill at `per_second` and up to `burst_size` requests may arrive
/// at once. Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// Rate limits are applied per client IP address extracted from the
/// socket peer address.
///
/// # Errors
///
/// Fails if either limit is zero.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/splits", post(create_split_handler))
///     .layer(rate_limit::layer(2, 100)?);
/// ```
pub fn layer(per_second: u64, burst_size: u32) -> anyhow::Result<ApiRateLimitLayer> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst_size)
        .finish()
        .ok_or_else(|| anyhow!("Rate limit values must be greater than zero"))?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}
