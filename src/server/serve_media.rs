//! Streams files from the media root, with single byte range support.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, BufReader, SeekFrom},
};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

const HEADER_BYTE_RANGE: &str = "Range";
const STREAM_CAPACITY: usize = 4096 * 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start_inclusive: Option<u64>,
    end_inclusive: Option<u64>,
}

impl ByteRange {
    pub fn new(start_inclusive: Option<u64>, end_inclusive: Option<u64>) -> ByteRange {
        ByteRange {
            start_inclusive,
            end_inclusive,
        }
    }

    fn parse<S: AsRef<str>>(s: S) -> Option<ByteRange> {
        let v = s.as_ref().trim();
        let v = v.strip_prefix("bytes=")?;

        let parts: Vec<&str> = v.split('-').collect();
        if parts.len() != 2 {
            return None;
        }

        Some(ByteRange {
            start_inclusive: parts[0].trim().parse::<u64>().ok(),
            end_inclusive: parts[1].trim().parse::<u64>().ok(),
        })
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<ByteRange> {
        headers
            .get(HEADER_BYTE_RANGE)
            .and_then(|x| x.to_str().ok())
            .and_then(ByteRange::parse)
            .filter(|range| range.start_inclusive.is_some() || range.end_inclusive.is_some())
    }

    /// Inclusive `(first, last)` byte positions within a file of
    /// `file_length` bytes, `None` when the range cannot be satisfied.
    fn resolve(&self, file_length: u64) -> Option<(u64, u64)> {
        if file_length == 0 {
            return None;
        }
        let last_byte = file_length - 1;
        match (self.start_inclusive, self.end_inclusive) {
            (Some(start), None) if start <= last_byte => Some((start, last_byte)),
            (Some(start), Some(end)) if start <= end && start <= last_byte => {
                Some((start, end.min(last_byte)))
            }
            // bytes=-N is the last N bytes.
            (None, Some(suffix)) if suffix > 0 => {
                Some((file_length.saturating_sub(suffix), last_byte))
            }
            _ => None,
        }
    }
}

/// `relative` is a decoded, `/`-separated path. Only plain segments are
/// accepted, so the joined path cannot climb out of the root.
pub fn is_safe_relative(relative: &str) -> bool {
    !relative.is_empty()
        && !relative.contains('\0')
        && relative
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
        && Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Canonical path of `relative` under `media_root`, if it is a regular file
/// that really lives there (symlinks pointing outside are refused).
async fn resolve_media_path(media_root: &Path, relative: &str) -> Option<PathBuf> {
    if !is_safe_relative(relative) {
        return None;
    }
    let root = tokio::fs::canonicalize(media_root).await.ok()?;
    let path = tokio::fs::canonicalize(root.join(relative)).await.ok()?;
    if !path.starts_with(&root) {
        warn!("Refusing to serve {} from outside the media root", path.display());
        return None;
    }
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => Some(path),
        _ => None,
    }
}

fn content_type_of(path: &Path) -> String {
    if let Ok(Some(kind)) = infer::get_from_path(path) {
        return kind.mime_type().to_string();
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("json") => "application/json",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
    .to_string()
}

pub async fn serve_media_file(
    media_root: &Path,
    relative: &str,
    byte_range: Option<ByteRange>,
    content_cache_age_sec: usize,
) -> Response {
    let path = match resolve_media_path(media_root, relative).await {
        Some(path) => path,
        None => {
            debug!("No media file at {:?}", relative);
            return StatusCode::NOT_FOUND.into_response();
        }
    };
    debug!("Serving media from path {}", path.display());

    let mut file = match File::open(&path).await {
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Ok(x) => x,
    };

    let file_length = match file.metadata().await {
        Ok(x) => x.len(),
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let (status_code, start_served, chunk_size) = match byte_range {
        None => (StatusCode::OK, 0, file_length),
        Some(range) => match range.resolve(file_length) {
            Some((first, last)) => (StatusCode::PARTIAL_CONTENT, first, last - first + 1),
            None => {
                return (
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [(header::CONTENT_RANGE, format!("bytes */{}", file_length))],
                )
                    .into_response()
            }
        },
    };

    if start_served > 0 && file.seek(SeekFrom::Start(start_served)).await.is_err() {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let file_reader = BufReader::with_capacity(STREAM_CAPACITY, file.take(chunk_size));
    let stream = ReaderStream::with_capacity(file_reader, STREAM_CAPACITY);

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status_code;
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&content_type_of(&path)) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(chunk_size));
    if let Ok(value) = HeaderValue::from_str(&format!("max-age={}", content_cache_age_sec)) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if status_code == StatusCode::PARTIAL_CONTENT {
        let content_range = format!(
            "bytes {}-{}/{}",
            start_served,
            start_served + chunk_size - 1,
            file_length
        );
        if let Ok(value) = HeaderValue::from_str(&content_range) {
            headers.insert(header::CONTENT_RANGE, value);
        }
    }
    response
}
