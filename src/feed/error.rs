use std::path::PathBuf;
use thiserror::Error;

/// Failures that prevent a feed from being produced at all.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Corrupt collection metadata {path:?}: {reason}")]
    CorruptCollectionMetadata { path: PathBuf, reason: String },

    #[error("Failed to render feed: {0}")]
    Render(#[from] quick_xml::se::SeError),
}

/// Recoverable issues found while resolving a feed. The feed is still
/// produced, these are surfaced so callers can log or report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    CorruptEpisodeSidecar { path: PathBuf, reason: String },
    PersistFailed { path: PathBuf, reason: String },
    DurationUnavailable { path: PathBuf, reason: String },
    UnreadableMedia { path: PathBuf, reason: String },
}
