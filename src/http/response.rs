//! HTTP response building module
//!
//! Provides builders for the responses the tracker emits, decoupled from the
//! data pipeline.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::{Response, StatusCode};

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build 200 HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    build_body_response(
        StatusCode::OK,
        "text/html; charset=utf-8",
        Bytes::from(content),
        is_head,
    )
}

/// Build JSON response with a pre-serialized body
pub fn build_json_response(
    status: StatusCode,
    json: String,
    is_head: bool,
) -> Response<Full<Bytes>> {
    build_body_response(status, "application/json", Bytes::from(json), is_head)
}

/// Build `{"error": message}` JSON response
pub fn build_json_error_response(
    status: StatusCode,
    message: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message });
    build_json_response(status, body.to_string(), is_head)
}

/// Build plain-text `Error: message` response
pub fn build_text_error_response(
    status: StatusCode,
    message: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    build_body_response(
        status,
        "text/plain; charset=utf-8",
        Bytes::from(format!("Error: {message}")),
        is_head,
    )
}

/// Build health check response
pub fn build_health_response(is_head: bool) -> Response<Full<Bytes>> {
    build_body_response(StatusCode::OK, "text/plain", Bytes::from_static(b"ok"), is_head)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", ALLOWED_METHODS)
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Stamp headers every response carries
pub fn apply_common_headers(
    response: &mut Response<Full<Bytes>>,
    server_name: &str,
    enable_cors: bool,
) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert(SERVER, value);
    }
    if enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}

/// Body response; HEAD keeps status and Content-Length but drops the body
fn build_body_response(
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
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
