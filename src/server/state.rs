use axum::extract::FromRef;

use crate::feed::FeedSynthesizer;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedFeedSynthesizer = Arc<FeedSynthesizer>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub synthesizer: GuardedFeedSynthesizer,
}

impl ServerState {
    pub fn new(config: ServerConfig, synthesizer: FeedSynthesizer) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            synthesizer: Arc::new(synthesizer),
        }
    }
}

impl FromRef<ServerState> for GuardedFeedSynthesizer {
    fn from_ref(input: &ServerState) -> Self {
        input.synthesizer.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
