//! Form server URL and client address helpers

use axum::http::HeaderMap;
use fieldsight_common::config::{HostSettings, TestingSettings};
use std::net::SocketAddr;

/// Host used when a request carries no `Host` header
pub const DEFAULT_HOST: &str = "localhost";

/// Base URL Enketo uses to fetch a user's forms: `<protocol>://<host>/<username>`
///
/// In testing mode the configured test host and username replace the request
/// values. Requests addressed to the internal hostname are served over plain
/// `http` unless the internal and public hostnames are the same.
pub fn form_url(
    host: &str,
    username: &str,
    protocol: &str,
    hosts: &HostSettings,
    testing: &TestingSettings,
) -> String {
    let (host, username) = if testing.enabled {
        (testing.http_host.as_str(), testing.username.as_str())
    } else {
        (host, username)
    };

    let internal = hosts.internal_hostname.as_deref();
    let protocol = if internal == Some(host) && hosts.public_hostname.as_deref() != internal {
        "http"
    } else {
        protocol
    };

    format!("{}://{}/{}", protocol, host, username)
}

/// `Host` header value, or [`DEFAULT_HOST`]
pub fn request_host(headers: &HeaderMap) -> &str {
    headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_HOST)
}

/// First `X-Forwarded-For` entry, else the peer address
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}
