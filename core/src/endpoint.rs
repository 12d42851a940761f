//! Parsing for the broker's `tcp://host:port` endpoint address.
//!
//! The spec treats this as a compile-time constant in the original
//! source; here it is always a runtime parameter (see
//! [`crate::config::AppConfig`]), but `tokio::net::TcpStream` wants a
//! bare `host:port`, so callers strip the `tcp://` scheme once here.

/// Strip a leading `tcp://` scheme, if present.
#[must_use]
pub fn strip_scheme(endpoint: &str) -> &str {
    endpoint.strip_prefix("tcp://").unwrap_or(endpoint)
}
