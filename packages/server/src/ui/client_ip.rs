//! Real client address behind reverse proxies.

use std::net::SocketAddr;

use axum::http::HeaderMap;

const IPV4_MAPPED_PREFIX: &str = "::ffff:";

/// `X-Real-IP`, else the first `X-Forwarded-For` entry, else the socket peer address.
pub fn extract_client_ip(headers: &HeaderMap, remote_addr: SocketAddr) -> String {
    let from_header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let ip = from_header("x-real-ip")
        .or_else(|| from_header("x-forwarded-for"))
        .unwrap_or_else(|| remote_addr.ip().to_canonical().to_string());

    match ip.strip_prefix(IPV4_MAPPED_PREFIX) {
        Some(v4) => v4.to_string(),
        None => ip,
    }
}
