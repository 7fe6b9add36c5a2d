//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! matching, and the load -> validate -> render pipeline per route.

use crate::config::AppState;
use crate::data;
use crate::error::{ClimateError, Result};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::render::{self, ChartOptions};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub const INDEX_PATH: &str = "/";
pub const DATA_API_PATH: &str = "/api/data";
pub const HEALTH_PATH: &str = "/healthz";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    // Owned copies: nothing borrowed from `req` is held across the await
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = route(&method, &path, &state).await;
    http::apply_common_headers(
        &mut response,
        &state.config.http.server_name,
        state.config.http.enable_cors,
    );

    if state.config.logging.access_log {
        let entry = access_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch one request by method and path
pub async fn route(method: &Method, path: &str, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return resp;
    }
    let is_head = *method == Method::HEAD;

    match path {
        INDEX_PATH => serve_index(state, is_head).await,
        DATA_API_PATH => serve_data(state, is_head).await,
        HEALTH_PATH => http::build_health_response(is_head),
        _ => {
            logger::log_debug(&format!("No route for {path}"));
            http::build_404_response()
        }
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// `GET /`: chart page, or `Error: <message>` as plain text
async fn serve_index(state: &Arc<AppState>, is_head: bool) -> Response<Full<Bytes>> {
    let state = Arc::clone(state);
    let result = run_pipeline(move || {
        let table = data::load_climate_table(Path::new(&state.config.data.path))?;
        let chart = &state.config.chart;
        let opts = ChartOptions {
            width: chart.width,
            height: chart.height,
            title: &chart.title,
            labels: state.chart_labels,
        };
        render::render_chart_base64(&table, &opts)
    })
    .await;

    match result {
        Ok(plot) => http::build_html_response(render::render_index_page(&plot), is_head),
        Err(e) => {
            log_pipeline_error(INDEX_PATH, &e);
            http::build_text_error_response(e.status_code(), &e.to_string(), is_head)
        }
    }
}

/// `GET /api/data`: JSON table, or `{"error": <message>}`
async fn serve_data(state: &Arc<AppState>, is_head: bool) -> Response<Full<Bytes>> {
    let state = Arc::clone(state);
    let result = run_pipeline(move || {
        let table = data::load_climate_table(Path::new(&state.config.data.path))?;
        render::render_json(&table)
    })
    .await;

    match result {
        Ok(json) => http::build_json_response(hyper::StatusCode::OK, json, is_head),
        Err(e) => {
            log_pipeline_error(DATA_API_PATH, &e);
            http::build_json_error_response(e.status_code(), &e.to_string(), is_head)
        }
    }
}

/// File reads and rasterizing block, so they run on the blocking pool
async fn run_pipeline<T, F>(job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job).await?
}

fn log_pipeline_error(path: &str, error: &ClimateError) {
    if error.is_data_error() {
        logger::log_warning(&format!("{path}: {error}"));
    } else {
        logger::log_error(&format!("{path}: {error}"));
    }
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
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
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or_default();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
