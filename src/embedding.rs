//! Optional vector-index hook.
//!
//! When an embedding collaborator is configured, the API layer notifies it
//! after each successful KB mutation. The hook is best-effort and
//! post-commit: it runs on a spawned task, the HTTP response never waits on
//! it, and failures never affect KB consistency.

use std::sync::Arc;

use async_trait::async_trait;

/// Receiver for document embedding updates.
#[async_trait]
pub trait EmbeddingHook: Send + Sync {
    /// Upsert the embedding for a document. Implementations handle their
    /// own failures; nothing propagates back to the KB.
    async fn upsert_doc_embedding(&self, id: &str, title: &str, content: &str);

    /// Remove a document from the vector index.
    async fn delete_doc_embedding(&self, id: &str);
}

/// Hook used when no embedding service is configured.
pub struct NoopEmbeddingHook;

#[async_trait]
impl EmbeddingHook for NoopEmbeddingHook {
    async fn upsert_doc_embedding(&self, _id: &str, _title: &str, _content: &str) {}

    async fn delete_doc_embedding(&self, _id: &str) {}
}

/// Fire-and-forget upsert notification. Skips blank documents, matching the
/// insert-side behaviour of the vector index.
pub fn notify_upsert(hook: &Option<Arc<dyn EmbeddingHook>>, id: &str, title: &str, content: &str) {
    let Some(hook) = hook else { return };
    if id.is_empty() || (title.trim().is_empty() && content.trim().is_empty()) {
        return;
    }
    let hook = hook.clone();
    let (id, title, content) = (id.to_string(), title.to_string(), content.to_string());
    tokio::spawn(async move {
        tracing::debug!(doc_id = %id, "dispatching embedding upsert");
        hook.upsert_doc_embedding(&id, &title, &content).await;
    });
}

/// Fire-and-forget delete notification.
pub fn notify_delete(hook: &Option<Arc<dyn EmbeddingHook>>, id: &str) {
    let Some(hook) = hook else { return };
    if id.is_empty() {
        return;
    }
    let hook = hook.clone();
    let id = id.to_string();
    tokio::spawn(async move {
        tracing::debug!(doc_id = %id, "dispatching embedding delete");
        hook.delete_doc_embedding(&id).await;
    });
}
