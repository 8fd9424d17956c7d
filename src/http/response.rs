//! HTTP response building module
//!
//! Provides builders for the handful of responses the relay produces.
//! HEAD requests get the same headers with an empty body.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};

/// Build 200 JSON response
pub fn build_json_response(json: Bytes, is_head: bool) -> Response<Full<Bytes>> {
    build_body_response(StatusCode::OK, "application/json; charset=utf-8", json, is_head)
}

/// Build response with an arbitrary body and content type
pub fn build_body_response(
    status: StatusCode,
    content_type: &str,
    data: Bytes,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut resp = Response::new(Full::new(Bytes::new()));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}

/// Build 404 Not Found response: the familiar `Cannot GET /path` error page
pub fn build_404_response(method: &Method, path: &str) -> Response<Full<Bytes>> {
    let page = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Error</title>\n</head>\n<body>\n<pre>Cannot {method} {}</pre>\n</body>\n</html>\n",
        escape_html(path)
    );
    build_body_response(
        StatusCode::NOT_FOUND,
        "text/html; charset=utf-8",
        Bytes::from(page),
        *method == Method::HEAD,
    )
}

/// Build 500 Internal Server Error response with a fixed plain-text message
pub fn build_500_response(message: &'static str, is_head: bool) -> Response<Full<Bytes>> {
    build_body_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "text/plain; charset=utf-8",
        Bytes::from_static(message.as_bytes()),
        is_head,
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
