//! Collection level metadata: `metadata.json` in the collection directory.

use super::error::FeedError;
use super::media::{feed_url, media_url};
use super::models::{Author, Collection};
use super::sidecar::{read_sidecar, CollectionSidecar, SidecarRead, COLLECTION_SIDECAR_FILE_NAME};
use super::synthesizer::{FeedConfig, PassLog};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

pub const DEFAULT_DESCRIPTION: &str = "Stuff to listen to later";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_AUTHOR: &str = "Anthology";

pub const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "png"];
const GENERIC_COVER_STEM: &str = "cover";

impl From<&Collection> for CollectionSidecar {
    fn from(collection: &Collection) -> Self {
        CollectionSidecar {
            name: Some(collection.name.clone()),
            description: Some(collection.description.clone()),
            website: Some(collection.website.clone()),
            complete: Some(collection.complete),
            language: Some(collection.language.clone()),
            feed_url: Some(collection.feed_url.clone()),
            explicit: Some(collection.explicit),
            authors: Some(Author::names(&collection.authors)),
            image: collection.image.clone(),
        }
    }
}

/// Resolves the collection named `name`, whose directory is `dir`.
///
/// A missing sidecar is replaced by defaults that are written back. A sidecar
/// that cannot be parsed fails the whole feed and is left as is.
pub(super) fn resolve_collection(
    config: &FeedConfig,
    name: &str,
    dir: &Path,
    log: &mut PassLog,
) -> Result<Collection, FeedError> {
    let sidecar_path = dir.join(COLLECTION_SIDECAR_FILE_NAME);
    let defaults = default_collection(config, name, dir);

    match read_sidecar::<CollectionSidecar>(&sidecar_path) {
        SidecarRead::Present(sidecar) => {
            debug!("Loaded collection metadata from {}", sidecar_path.display());
            Ok(merge_collection(sidecar, defaults))
        }
        SidecarRead::Corrupt(reason) => {
            error!(
                "Failed to read collection metadata {}: {}",
                sidecar_path.display(),
                reason
            );
            Err(FeedError::CorruptCollectionMetadata {
                path: sidecar_path,
                reason,
            })
        }
        SidecarRead::Absent => {
            if dir.is_dir() {
                log.persist(&sidecar_path, &CollectionSidecar::from(&defaults));
            }
            Ok(defaults)
        }
    }
}

fn merge_collection(sidecar: CollectionSidecar, defaults: Collection) -> Collection {
    Collection {
        name: sidecar.name.unwrap_or(defaults.name),
        description: sidecar.description.unwrap_or(defaults.description),
        website: sidecar.website.unwrap_or(defaults.website),
        language: sidecar.language.unwrap_or(defaults.language),
        explicit: sidecar.explicit.unwrap_or(defaults.explicit),
        complete: sidecar.complete.unwrap_or(defaults.complete),
        feed_url: sidecar.feed_url.unwrap_or(defaults.feed_url),
        image: sidecar.image.or(defaults.image),
        authors: sidecar
            .authors
            .map(|names| Author::from_names(&names))
            .unwrap_or(defaults.authors),
    }
}

fn default_collection(config: &FeedConfig, name: &str, dir: &Path) -> Collection {
    Collection {
        name: format!("{} Archive", name),
        description: DEFAULT_DESCRIPTION.to_string(),
        website: config.base_url.clone(),
        language: DEFAULT_LANGUAGE.to_string(),
        explicit: false,
        complete: false,
        feed_url: feed_url(&config.base_url, name),
        image: find_cover(name, dir)
            .and_then(|path| media_url(&config.base_url, &config.media_root, &path)),
        authors: vec![Author::new(DEFAULT_AUTHOR)],
    }
}

/// `{name}.jpg`, `{name}.png`, then the generic `cover.jpg`, `cover.png`.
fn find_cover(name: &str, dir: &Path) -> Option<PathBuf> {
    let stem = Path::new(name)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())?;

    [stem.as_str(), GENERIC_COVER_STEM]
        .iter()
        .flat_map(|stem| {
            IMAGE_EXTENSIONS
                .iter()
                .map(move |ext| dir.join(format!("{}.{}", stem, ext)))
        })
        .find(|candidate| candidate.is_file())
}
