//! Repository trait and the in-memory backend.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::kb::config::{KbBackend, KbConfig};
use crate::kb::document::{Doc, SearchItem};
use crate::kb::error::KbResult;
use crate::kb::index::DocIndex;
use crate::kb::ngram::ngrams;
use crate::kb::score;

/// Diagnostics snapshot for the info endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbInfo {
    pub backend: String,
    pub documents: usize,
    pub ngram_n: usize,
}

/// Knowledge-base document repository.
///
/// `add` and `update` are both upserts: applying either against any id
/// yields the same post-state. `delete` on an absent id is a silent
/// success. `search` returns the ranked items truncated to `limit` plus the
/// untruncated candidate count; a `limit` of zero falls back to the
/// configured default.
#[async_trait]
pub trait KbRepository: Send + Sync {
    async fn add(&self, doc: Doc) -> KbResult<()>;

    async fn get(&self, id: &str) -> Option<Doc>;

    async fn update(&self, doc: Doc) -> KbResult<()>;

    async fn delete(&self, id: &str) -> KbResult<()>;

    async fn search(&self, query: &str, limit: usize) -> KbResult<(Vec<SearchItem>, usize)>;

    async fn info(&self) -> KbInfo;
}

/// In-memory repository: one readers-writer lock guards the document store,
/// both postings tables, and both gram caches as a single logical resource.
/// Mutations hold the lock exclusively for the whole remove-then-add
/// protocol; a concurrent search observes either the pre- or the post-state,
/// never a mixture across fields.
pub struct MemoryRepo {
    index: RwLock<DocIndex>,
    config: KbConfig,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::with_config(KbConfig::default())
    }

    pub fn with_config(config: KbConfig) -> Self {
        Self {
            index: RwLock::new(DocIndex::new(config.ngram_n)),
            config,
        }
    }
}

impl Default for MemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KbRepository for MemoryRepo {
    async fn add(&self, doc: Doc) -> KbResult<()> {
        let id = doc.id.clone();
        self.index.write().upsert(doc);
        tracing::debug!(doc_id = %id, "kb document added");
        Ok(())
    }

    async fn get(&self, id: &str) -> Option<Doc> {
        self.index.read().get(id).cloned()
    }

    async fn update(&self, doc: Doc) -> KbResult<()> {
        let id = doc.id.clone();
        self.index.write().upsert(doc);
        tracing::debug!(doc_id = %id, "kb document updated");
        Ok(())
    }

    async fn delete(&self, id: &str) -> KbResult<()> {
        let removed = self.index.write().remove(id);
        tracing::debug!(doc_id = %id, removed, "kb document deleted");
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> KbResult<(Vec<SearchItem>, usize)> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Ok((Vec::new(), 0));
        }
        let limit = if limit == 0 {
            self.config.search_default_limit
        } else {
            limit
        };

        // Collect candidates under the shared lock, rank on the local
        // snapshot after release.
        let mut items = {
            let index = self.index.read();
            let grams = ngrams(&q, index.ngram_n());
            if grams.is_empty() {
                score::substring_candidates(&index, &q, &self.config)
            } else {
                score::index_candidates(&index, &grams, &self.config)
            }
        };

        score::rank(&mut items);
        let total = items.len();
        items.truncate(limit);
        Ok((items, total))
    }

    async fn info(&self) -> KbInfo {
        let index = self.index.read();
        KbInfo {
            backend: KbBackend::Memory.as_str().to_string(),
            documents: index.len(),
            ngram_n: index.ngram_n(),
        }
    }
}

/// Create a repository for the configured backend.
pub fn create_repository(config: &KbConfig) -> Arc<dyn KbRepository> {
    match config.backend {
        KbBackend::Memory => {
            tracing::info!(ngram_n = config.ngram_n, "Initializing in-memory KB repository");
            Arc::new(MemoryRepo::with_config(config.clone()))
        }
    }
}
