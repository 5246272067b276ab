//! Episode discovery and per-episode metadata resolution.

use super::collection::IMAGE_EXTENSIONS;
use super::duration::probe_duration;
use super::error::Problem;
use super::media::media_url;
use super::models::{Author, Collection, Episode, MediaRef};
use super::sidecar::{
    read_sidecar, EpisodeSidecar, SidecarRead, COLLECTION_SIDECAR_FILE_NAME, SIDECAR_EXTENSION,
};
use super::synthesizer::{FeedConfig, PassLog};
use chrono::{DateTime, Utc};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use walkdir::WalkDir;

pub const AUDIO_EXTENSION: &str = "mp3";
pub const DEFAULT_SUMMARY: &str = "Some Summary";

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(AUDIO_EXTENSION))
        .unwrap_or(false)
}

/// Every audio file under `dir`, recursively.
///
/// The walk is depth first with the entries of each directory sorted by
/// file name, so `a/z.mp3` comes before `a.mp3`. This is not a
/// publication order.
pub(super) fn discover_media_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), err);
                None
            }
        })
        .filter(|entry| is_audio_file(entry.path()) && entry.path().is_file())
        .filter(|entry| {
            let collides = entry.depth() == 1
                && entry.path().with_extension(SIDECAR_EXTENSION).file_name()
                    == Some(OsStr::new(COLLECTION_SIDECAR_FILE_NAME));
            if collides {
                warn!(
                    "Skipping {}, its metadata would be the collection's {}",
                    entry.path().display(),
                    COLLECTION_SIDECAR_FILE_NAME
                );
            }
            !collides
        })
        .map(|entry| entry.into_path())
        .collect()
}

fn find_sibling_image(path: &Path) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| path.with_extension(ext))
        .find(|candidate| candidate.is_file())
}

/// Resolves one episode, or `None` if the media file itself is unusable.
///
/// Sidecar values win field by field. A sidecar is written only when none
/// existed, a corrupt one is left for a human to fix.
pub(super) fn resolve_episode(
    config: &FeedConfig,
    collection: &Collection,
    path: &Path,
    log: &mut PassLog,
) -> Option<Episode> {
    let sidecar_path = path.with_extension(SIDECAR_EXTENSION);
    let read = read_sidecar::<EpisodeSidecar>(&sidecar_path);
    let sidecar_existed = read.exists();
    if let SidecarRead::Corrupt(reason) = &read {
        error!("Failed to read {}: {}", sidecar_path.display(), reason);
        log.problem(Problem::CorruptEpisodeSidecar {
            path: sidecar_path.clone(),
            reason: reason.clone(),
        });
    }
    let sidecar = read.into_present().unwrap_or_default();

    let media = match resolve_media(config, path, log) {
        Some(media) => media,
        None => return None,
    };

    let publication_date = match sidecar.publication_date {
        Some(date) => date,
        None => match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => DateTime::<Utc>::from(modified),
            Err(err) => {
                warn!("Could not read mtime of {}: {}", path.display(), err);
                log.problem(Problem::UnreadableMedia {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
                return None;
            }
        },
    };

    let episode = Episode {
        title: sidecar.title.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        }),
        summary: sidecar
            .summary
            .unwrap_or_else(|| htmlescape::encode_minimal(DEFAULT_SUMMARY)),
        link: sidecar.link,
        authors: sidecar
            .authors
            .map(|names| Author::from_names(&names))
            .unwrap_or_else(|| collection.authors.clone()),
        publication_date,
        media,
        image: sidecar.image.or_else(|| {
            find_sibling_image(path)
                .and_then(|image| media_url(&config.base_url, &config.media_root, &image))
        }),
    };

    if !sidecar_existed {
        log.persist(&sidecar_path, &inferred_sidecar(&episode));
    }

    Some(episode)
}

fn resolve_media(config: &FeedConfig, path: &Path, log: &mut PassLog) -> Option<MediaRef> {
    let unreadable = |reason: String| Problem::UnreadableMedia {
        path: path.to_path_buf(),
        reason,
    };

    let size_bytes = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(err) => {
            warn!("Could not stat {}: {}", path.display(), err);
            log.problem(unreadable(err.to_string()));
            return None;
        }
    };

    let url = match media_url(&config.base_url, &config.media_root, path) {
        Some(url) => url,
        None => {
            log.problem(unreadable("not under the media root".to_string()));
            return None;
        }
    };

    let duration = match probe_duration(path) {
        Ok(duration) => Some(duration),
        Err(reason) => {
            warn!("No duration for {}: {}", path.display(), reason);
            log.problem(Problem::DurationUnavailable {
                path: path.to_path_buf(),
                reason,
            });
            None
        }
    };

    Some(MediaRef {
        url,
        size_bytes,
        duration,
    })
}

fn inferred_sidecar(episode: &Episode) -> EpisodeSidecar {
    EpisodeSidecar {
        title: Some(episode.title.clone()),
        summary: Some(episode.summary.clone()),
        link: None,
        authors: Some(Author::names(&episode.authors)),
        publication_date: Some(episode.publication_date),
        image: episode.image.clone(),
    }
}
