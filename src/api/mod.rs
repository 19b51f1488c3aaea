pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::embedding::EmbeddingHook;
use crate::kb::KbRepository;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn KbRepository>,
    pub embedding: Option<Arc<dyn EmbeddingHook>>,
    pub search_default_limit: usize,
    pub search_max_limit: usize,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(repo: Arc<dyn KbRepository>) -> Self {
        Self {
            repo,
            embedding: None,
            search_default_limit: 10,
            search_max_limit: 50,
            started_at: Instant::now(),
        }
    }

    /// Set the embedding hook notified after successful mutations
    pub fn with_embedding_hook(mut self, hook: Arc<dyn EmbeddingHook>) -> Self {
        self.embedding = Some(hook);
        self
    }

    /// Override the search limit defaults from configuration
    pub fn with_search_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.search_default_limit = default_limit;
        self.search_max_limit = max_limit;
        self
    }
}
