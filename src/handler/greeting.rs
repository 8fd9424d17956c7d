//! `GET /api` handler

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde::Serialize;
use std::sync::OnceLock;

use crate::http;

#[derive(Serialize)]
struct Greeting {
    message: &'static str,
}

/// Serialized once; every response shares the same bytes
fn greeting_body() -> Bytes {
    static BODY: OnceLock<Bytes> = OnceLock::new();
    BODY.get_or_init(|| {
        let greeting = Greeting {
            message: "Hello, World!",
        };
        serde_json::to_vec(&greeting).map_or_else(
            |_| Bytes::from_static(br#"{"message":"Hello, World!"}"#),
            Bytes::from,
        )
    })
    .clone()
}

pub fn serve_greeting(is_head: bool) -> Response<Full<Bytes>> {
    http::build_json_response(greeting_body(), is_head)
}
