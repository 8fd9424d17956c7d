// Application state module
// Read-only state shared by every connection

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::error::ServerError;
use crate::upstream::BlobFetcher;

/// Application state
pub struct AppState {
    pub config: Config,
    pub fetcher: BlobFetcher,

    // Only mutable field; guards `performance.max_connections`
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, ServerError> {
        let fetcher = BlobFetcher::new(&config.upstream)?;

        Ok(Self {
            config: config.clone(),
            fetcher,
            active_connections: AtomicUsize::new(0),
        })
    }
}
