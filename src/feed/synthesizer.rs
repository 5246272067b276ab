use super::collection::resolve_collection;
use super::episode::{discover_media_files, resolve_episode};
use super::error::{FeedError, Problem};
use super::models::{Episode, Feed};
use super::sidecar::{create_sidecar, PersistOutcome};
use crate::rss::render_feed;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// What the outside world connects to us as, without trailing slash.
    pub base_url: String,
    /// Each subdirectory is a collection, files are served from here.
    pub media_root: PathBuf,
}

impl FeedConfig {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(base_url: S, media_root: P) -> FeedConfig {
        FeedConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            media_root: media_root.into(),
        }
    }
}

/// Side effects and recoverable issues of one resolution pass.
#[derive(Debug, Default)]
pub(super) struct PassLog {
    pub(super) problems: Vec<Problem>,
    pub(super) persisted: Vec<PathBuf>,
}

impl PassLog {
    pub(super) fn problem(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    /// Writes a sidecar that did not exist. Failures are recorded, not raised.
    pub(super) fn persist<T: Serialize>(&mut self, path: &Path, value: &T) {
        match create_sidecar(path, value) {
            Ok(PersistOutcome::Created) => {
                info!("Saved inferred metadata to {}", path.display());
                self.persisted.push(path.to_path_buf());
            }
            Ok(PersistOutcome::AlreadyExists) => {
                debug!("{} already exists, left untouched", path.display());
            }
            Err(err) => {
                warn!("Failed to save metadata to {}: {}", path.display(), err);
                self.problems.push(Problem::PersistFailed {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
            }
        }
    }
}

/// Result of resolving one collection.
#[derive(Debug)]
pub struct Synthesis {
    pub feed: Feed,
    pub problems: Vec<Problem>,
    /// Sidecars created during this pass.
    pub persisted: Vec<PathBuf>,
}

/// Builds feeds by re-scanning a collection directory on every call.
///
/// No state is kept between calls other than one lock per existing
/// collection directory, which serializes sidecar creation for concurrent
/// requests of the same collection.
pub struct FeedSynthesizer {
    config: FeedConfig,
    collection_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FeedSynthesizer {
    pub fn new(config: FeedConfig) -> FeedSynthesizer {
        FeedSynthesizer {
            config,
            collection_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn collection_dir(&self, name: &str) -> PathBuf {
        self.config.media_root.join(name)
    }

    pub fn collection_exists(&self, name: &str) -> bool {
        self.collection_dir(name).is_dir()
    }

    /// Names of the immediate subdirectories of the media root, sorted.
    pub fn list_collections(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.config.media_root) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "Could not list media root {}: {}",
                    self.config.media_root.display(),
                    err
                );
                return Vec::new();
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    fn collection_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .collection_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(name.to_owned()).or_default().clone()
    }

    /// Resolves the collection `name` and all of its episodes, creating any
    /// missing sidecar along the way.
    ///
    /// `name` is trusted to be a relative path below the media root. A
    /// collection without a directory yields a feed with no episodes, writes
    /// nothing and takes no lock, so the lock map only grows with directories
    /// that exist.
    pub fn synthesize(&self, name: &str) -> Result<Synthesis, FeedError> {
        let dir = self.collection_dir(name);
        let lock = dir.is_dir().then(|| self.collection_lock(name));
        let _guard = lock
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner));

        let mut log = PassLog::default();

        let collection = resolve_collection(&self.config, name, &dir, &mut log)?;
        let episodes: Vec<Episode> = discover_media_files(&dir)
            .iter()
            .filter_map(|path| resolve_episode(&self.config, &collection, path, &mut log))
            .collect();

        info!(
            "Resolved feed {:?}: {} episodes, {} sidecars created, {} problems",
            name,
            episodes.len(),
            log.persisted.len(),
            log.problems.len()
        );

        Ok(Synthesis {
            feed: Feed {
                collection,
                episodes,
            },
            problems: log.problems,
            persisted: log.persisted,
        })
    }

    /// Resolves and renders the feed of `name` as an RSS document.
    pub fn generate(&self, name: &str) -> Result<String, FeedError> {
        let synthesis = self.synthesize(name)?;
        Ok(render_feed(&synthesis.feed)?)
    }
}
