//! Podcast Feed Server Library
//!
//! Turns directories of audio files into podcast feeds and serves both the
//! feeds and the files. Exposed as a library for the binary and for tests.

pub mod config;
pub mod feed;
pub mod rss;
pub mod server;

// Re-export commonly used types for convenience
pub use feed::{FeedConfig, FeedError, FeedSynthesizer, Problem, Synthesis};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
