//! Web-safe URLs for files living under the media root.
//!
//! Every path segment is percent-encoded, except that a space becomes `+`.
//! A literal `+` is therefore always sent as `%2B`, which keeps
//! [`decode_path`] an exact inverse of [`encode_path`].

use std::path::{Component, Path};
use std::string::FromUtf8Error;

pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).replace("%20", "+")
}

/// Encodes a `/`-separated relative path, segment by segment.
pub fn encode_path(relative: &str) -> String {
    relative
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

pub fn decode_path(encoded: &str) -> Result<String, FromUtf8Error> {
    urlencoding::decode(&encoded.replace('+', " ")).map(|decoded| decoded.into_owned())
}

/// Path of `path` relative to `media_root`, with `/` separators.
pub fn relative_path(media_root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(media_root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

pub fn media_url(base_url: &str, media_root: &Path, path: &Path) -> Option<String> {
    relative_path(media_root, path).map(|relative| format!("{}/{}", base_url, encode_path(&relative)))
}

pub fn feed_url(base_url: &str, collection: &str) -> String {
    format!("{}/feeds/{}/rss", base_url, encode_path(collection))
}
