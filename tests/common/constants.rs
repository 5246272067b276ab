//! Shared constants for end-to-end tests
//!
//! When the fixture media root changes, update only this file.

// ============================================================================
// Test Media Root
// ============================================================================

/// Collection with two episodes and a cover
pub const COLLECTION: &str = "Test";

/// URL-encoded form of [`COLLECTION`]'s episode with a space in its name
pub const EPISODE_1_PATH: &str = "Test/My+Episode.mp3";

/// File name of the first episode, as stored on disk
pub const EPISODE_1_FILE: &str = "My Episode.mp3";

/// File name of the second episode, which has a hand-written sidecar
pub const EPISODE_2_FILE: &str = "Other.mp3";

/// Title kept from the second episode's sidecar
pub const EPISODE_2_TITLE: &str = "Keep Me";

/// Collection whose metadata.json cannot be parsed
pub const BROKEN_COLLECTION: &str = "Broken";

/// Collection with a space in its name and no files
pub const EMPTY_COLLECTION: &str = "Empty Show";

/// Size of every fixture episode
pub const TEST_AUDIO_SIZE_BYTES: usize = 2048;

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
