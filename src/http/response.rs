//! HTTP response building module
//!
//! Builders for every response the badge server emits. All of them stamp the
//! configured `Server` header and, when enabled, the CORS header.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

use crate::config::HttpConfig;

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Start a response with the headers every answer carries
fn base_builder(status: StatusCode, http_config: &HttpConfig) -> Builder {
    let builder = Response::builder()
        .status(status)
        .header("Server", &http_config.server_name);

    if http_config.enable_cors {
        builder.header("Access-Control-Allow-Origin", "*")
    } else {
        builder
    }
}

/// Build 200 response carrying a rendered badge
pub fn build_badge_response(svg: String, http_config: &HttpConfig) -> Response<Full<Bytes>> {
    let content_length = svg.len();
    base_builder(StatusCode::OK, http_config)
        .header("Content-Type", SVG_CONTENT_TYPE)
        .header("Content-Length", content_length)
        .body(Full::new(Bytes::from(svg)))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build plain-text response with an arbitrary status
pub fn build_text_response(
    status: StatusCode,
    message: &str,
    http_config: &HttpConfig,
) -> Response<Full<Bytes>> {
    base_builder(status, http_config)
        .header("Content-Type", TEXT_CONTENT_TYPE)
        .header("Content-Length", message.len())
        .body(Full::new(Bytes::from(message.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut fallback = Response::new(Full::new(Bytes::from(message.to_string())));
            *fallback.status_mut() = status;
            fallback
        })
}

/// Build 400 response for paths that are not badge routes
pub fn build_400_response(http_config: &HttpConfig) -> Response<Full<Bytes>> {
    build_text_response(StatusCode::BAD_REQUEST, "Invalid URL", http_config)
}

/// Build 500 response carrying the error message
pub fn build_500_response(message: &str, http_config: &HttpConfig) -> Response<Full<Bytes>> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, message, http_config)
}

/// Build health check response
pub fn build_health_response(status: &str, http_config: &HttpConfig) -> Response<Full<Bytes>> {
    build_text_response(StatusCode::OK, status, http_config)
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
