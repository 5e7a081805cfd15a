// src/state.rs
//! Shared state handed to every route handler.

use crate::cache::CacheManager;
use crate::config::SiteConfig;
use crate::content::ContentQueries;
use crate::notion::ContentSource;
use crate::revalidation::Revalidator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ContentSource>,
    pub cache: Arc<CacheManager>,
    /// Receives invalidations; the cache itself unless overridden.
    pub revalidator: Arc<dyn Revalidator>,
    pub queries: ContentQueries,
    pub config: Arc<SiteConfig>,
}

impl AppState {
    pub fn new(config: SiteConfig, source: Arc<dyn ContentSource>, cache: Arc<CacheManager>) -> Self {
        let queries = ContentQueries::new(source.clone(), cache.clone(), config.databases.clone());
        Self {
            source,
            revalidator: cache.clone(),
            cache,
            queries,
            config: Arc::new(config),
        }
    }

    /// Route invalidations somewhere other than the local cache.
    pub fn with_revalidator(mut self, revalidator: Arc<dyn Revalidator>) -> Self {
        self.revalidator = revalidator;
        self
    }
}
