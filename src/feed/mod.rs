//! Feed synthesis: turns a collection directory plus its sidecar metadata
//! into an in-memory feed, writing back whatever had to be inferred.

mod collection;
mod duration;
mod episode;
mod error;
pub mod media;
mod models;
pub mod sidecar;
mod synthesizer;

pub use collection::{DEFAULT_AUTHOR, DEFAULT_DESCRIPTION, DEFAULT_LANGUAGE};
pub use episode::{AUDIO_EXTENSION, DEFAULT_SUMMARY};
pub use error::{FeedError, Problem};
pub use models::{Author, Collection, Episode, Feed, MediaRef};
pub use synthesizer::{FeedConfig, FeedSynthesizer, Synthesis};
