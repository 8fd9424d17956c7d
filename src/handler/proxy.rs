//! `GET /pub/dummyfile` handler
//!
//! Relays the upstream blob verbatim. Every failure collapses into one 500.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::config::AppState;
use crate::http;
use crate::logger;

pub const FETCH_ERROR_MESSAGE: &str = "Error fetching the file";

pub async fn serve_dummyfile(state: &AppState, is_head: bool) -> Response<Full<Bytes>> {
    match state.fetcher.fetch().await {
        Ok(upstream) => {
            let content_type = upstream
                .content_type
                .unwrap_or_else(|| state.config.upstream.default_content_type.clone());
            http::build_body_response(StatusCode::OK, &content_type, upstream.bytes, is_head)
        }
        Err(e) => {
            logger::log_error(&format!(
                "Failed to fetch {}: {e}",
                state.fetcher.url()
            ));
            http::build_500_response(FETCH_ERROR_MESSAGE, is_head)
        }
    }
}
