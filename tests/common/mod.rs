//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, COLLECTION};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_get_feed() {
//!     let server = TestServer::spawn().await;
//!
//!     let response = server.get(&format!("/feeds/{}/rss", COLLECTION)).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use constants::*;
pub use server::TestServer;

// Keep fixtures internal - only accessed via TestServer::spawn()
#[allow(unused_imports)]
pub(crate) use fixtures::create_test_media_root;
