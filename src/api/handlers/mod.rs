//! HTTP request handlers for API endpoints.
//!
//! This module contains all request handlers organized by resource type.

pub mod auth;
pub mod catalogue;
pub mod courses;
pub mod health;

use axum::http::{HeaderMap, Uri, header};

const FALLBACK_HOST: &str = "localhost";

fn request_host(headers: &HeaderMap) -> &str {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or(FALLBACK_HOST)
}

/// `links.href` of a list response: the host the client used followed by the
/// full request path.
pub(crate) fn list_href(headers: &HeaderMap, uri: &Uri) -> String {
    format!("{}{}", request_host(headers), uri.path())
}

/// Scheme and host for links mailed to the user. Honours
/// `X-Forwarded-Proto` when a proxy terminates TLS.
pub(crate) fn site_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .filter(|p| *p == "https" || *p == "http")
        .unwrap_or("http");
    format!("{}://{}", scheme, request_host(headers))
}
