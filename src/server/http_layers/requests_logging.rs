//! Request logging middleware

use super::super::state::ServerState;
use axum::extract::{ConnectInfo, State};
use axum::{
    body::Body,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::info;

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Polled by monitoring every few seconds, kept out of the logs.
const UNLOGGED_PATHS: &[&str] = &["/health"];

fn level_for(path: &str, configured: &RequestsLoggingLevel) -> RequestsLoggingLevel {
    if UNLOGGED_PATHS.contains(&path) {
        RequestsLoggingLevel::None
    } else {
        configured.clone()
    }
}

/// Human readable `Content-Length`, `-` for streamed or unknown sizes.
fn served_size(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .map(|size| format!("{:#}", byte_unit::Byte::from(size)))
        .unwrap_or_else(|| "-".to_string())
}

fn log_headers(label: &str, headers: &HeaderMap) {
    info!("  {} headers:", label);
    for (name, value) in headers.iter() {
        info!("    {}: {:?}", name, value);
    }
}

pub async fn log_requests(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let level = level_for(&path, &state.config.requests_logging_level);
    if level == RequestsLoggingLevel::None {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.to_string())
        .unwrap_or_else(|| "-".to_string());

    info!(">>> {} {} {}", remote, method, request.uri());
    if level >= RequestsLoggingLevel::Headers {
        log_headers("Request", request.headers());
    }

    let response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        log_headers("Response", response.headers());
    }
    info!(
        "<<< {} {} {} {} ({}ms)",
        response.status().as_u16(),
        method,
        path,
        served_size(response.headers()),
        start.elapsed().as_millis()
    );

    response
}
