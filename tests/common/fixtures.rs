//! Test fixture creation
//!
//! Builds a throwaway media root laid out like a real one.

use super::constants::*;
use anyhow::Result;
use std::fs;
use tempfile::TempDir;

/// Deterministic, non-audio payload so range requests can be checked byte by byte.
pub fn audio_bytes() -> Vec<u8> {
    (0..TEST_AUDIO_SIZE_BYTES).map(|i| (i % 251) as u8).collect()
}

/// Creates a media root with:
/// - `Test/` holding two episodes, a cover and one episode sidecar
/// - `Broken/` holding an unparseable collection sidecar
/// - `Empty Show/` with nothing in it
pub fn create_test_media_root() -> Result<TempDir> {
    let root = TempDir::new()?;

    let collection = root.path().join(COLLECTION);
    fs::create_dir_all(&collection)?;
    fs::write(collection.join(EPISODE_1_FILE), audio_bytes())?;
    fs::write(collection.join(EPISODE_2_FILE), audio_bytes())?;
    fs::write(collection.join(format!("{}.jpg", COLLECTION)), b"cover")?;
    fs::write(
        collection.join("Other.json"),
        format!("{{\"title\": \"{}\"}}", EPISODE_2_TITLE),
    )?;

    let broken = root.path().join(BROKEN_COLLECTION);
    fs::create_dir_all(&broken)?;
    fs::write(broken.join("metadata.json"), b"{ not json")?;

    fs::create_dir_all(root.path().join(EMPTY_COLLECTION))?;

    Ok(root)
}
