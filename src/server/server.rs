use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{error, info, warn};

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::serve_media::{is_safe_relative, serve_media_file, ByteRange};
use super::{log_requests, state::*, ServerConfig};
use crate::feed::media::{decode_path, feed_url};
use crate::feed::FeedSynthesizer;

const FEEDS_PREFIX: &str = "feeds/";
const RSS_SUFFIX: &str = "/rss";
const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
    pub feeds: Vec<String>,
}

#[derive(Serialize)]
struct HealthStatus {
    pub status: &'static str,
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let base_url = &state.synthesizer.config().base_url;
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
        feeds: state
            .synthesizer
            .list_collections()
            .iter()
            .map(|name| feed_url(base_url, name))
            .collect(),
    };
    Json(stats)
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok",
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

/// Collection name of a decoded `feeds/{name}/rss` path.
fn feed_name(decoded: &str) -> Option<&str> {
    decoded.strip_prefix(FEEDS_PREFIX)?.strip_suffix(RSS_SUFFIX)
}

/// Every request below the root lands here: the raw path is decoded with the
/// same convention media URLs are encoded with, then routed to a feed or to
/// a file.
async fn dispatch(State(state): State<ServerState>, uri: Uri, headers: HeaderMap) -> Response {
    let raw = uri.path().trim_start_matches('/');
    let decoded = match decode_path(raw) {
        Ok(x) => x,
        Err(err) => {
            warn!("Undecodable request path {:?}: {}", raw, err);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match feed_name(&decoded) {
        Some(name) => get_feed(state.synthesizer.clone(), name.to_owned()).await,
        None => {
            serve_media_file(
                &state.synthesizer.config().media_root,
                &decoded,
                ByteRange::from_headers(&headers),
                state.config.content_cache_age_sec,
            )
            .await
        }
    }
}

async fn get_feed(synthesizer: GuardedFeedSynthesizer, name: String) -> Response {
    if !is_safe_relative(&name) {
        warn!("Rejecting invalid feed name {:?}", name);
        return StatusCode::BAD_REQUEST.into_response();
    }
    if !synthesizer.collection_exists(&name) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let generated = tokio::task::spawn_blocking(move || synthesizer.generate(&name)).await;
    match generated {
        Ok(Ok(xml)) => {
            let mut response = xml.into_response();
            let headers = response.headers_mut();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(RSS_CONTENT_TYPE));
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            response
        }
        Ok(Err(err)) => {
            error!("Could not generate feed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(err) => {
            error!("Feed generation task failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn make_app(config: ServerConfig, synthesizer: FeedSynthesizer) -> Router {
    let state = ServerState::new(config, synthesizer);

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/{*path}", get(dispatch))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

pub async fn run_server(synthesizer: FeedSynthesizer, config: ServerConfig) -> Result<()> {
    let address = format!("{}:{}", config.host, config.port);
    info!(
        "Serving {} as {} on {}",
        synthesizer.config().media_root.display(),
        synthesizer.config().base_url,
        address
    );
    let app = make_app(config, synthesizer);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    Ok(axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?)
}
