//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, dispatch and access logging.

use crate::config::AppState;
use crate::handler::{greeting, proxy};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub const GREETING_PATH: &str = "/api";
pub const DUMMYFILE_PATH: &str = "/pub/dummyfile";

/// Main entry point for HTTP request handling
///
/// Only the request head is consulted, so the body type is left open.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = route_request(&method, &path, &state).await;

    if state.config.logging.access_log {
        log_access(&req, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// Route request based on method and path
async fn route_request(method: &Method, path: &str, state: &AppState) -> Response<Full<Bytes>> {
    let is_head = *method == Method::HEAD;
    if *method != Method::GET && !is_head {
        return http::build_404_response(method, path);
    }

    let route = normalize_path(path);
    if route.eq_ignore_ascii_case(GREETING_PATH) {
        greeting::serve_greeting(is_head)
    } else if route.eq_ignore_ascii_case(DUMMYFILE_PATH) {
        proxy::serve_dummyfile(state, is_head).await
    } else {
        http::build_404_response(method, path)
    }
}

/// Drop a single trailing slash so `/api/` routes like `/api`.
/// Matching itself ignores ASCII case.
fn normalize_path(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}
