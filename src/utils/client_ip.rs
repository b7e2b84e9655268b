//! Client address extraction for click metadata.

use axum::http::{HeaderMap, HeaderName};
use std::net::SocketAddr;

static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
static X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// Resolves the requester address recorded with a click.
///
/// When the service runs behind a trusted reverse proxy, the first entry of
/// `X-Forwarded-For` wins, then `X-Real-IP`. Otherwise (or when neither header
/// is usable) the socket peer address is used. The value is opaque to the
/// engine and never parsed further.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(headers) {
        return ip;
    }

    peer.ip().to_string()
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let from_forwarded_for = headers
        .get(&X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let ip = from_forwarded_for.or_else(|| {
        headers
            .get(&X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })?;

    Some(ip.to_string())
}
