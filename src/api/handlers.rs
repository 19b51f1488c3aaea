use crate::api::AppState;
use crate::embedding::{notify_delete, notify_upsert};
use crate::error::{AppError, Result};
use crate::kb::{Doc, KbInfo, SearchItem};
use crate::metrics;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Prometheus metrics endpoint
pub async fn metrics() -> Result<([(header::HeaderName, &'static str); 1], String)> {
    let body = metrics::render().map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

/// Create a document
pub async fn create_doc(
    State(state): State<AppState>,
    Json(request): Json<CreateDocRequest>,
) -> Result<(StatusCode, Json<DocIdResponse>)> {
    request.validate()?;

    let doc = Doc::new(Uuid::new_v4().to_string(), request.title, request.content);
    let id = doc.id.clone();
    state.repo.add(doc.clone()).await?;

    metrics::KB_DOCS_CREATED.inc();
    notify_upsert(&state.embedding, &doc.id, &doc.title, &doc.content);

    Ok((StatusCode::CREATED, Json(DocIdResponse { id })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDocRequest {
    #[validate(length(min = 1, message = "title required"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct DocIdResponse {
    pub id: String,
}

/// Update a document (partial upsert: a missing id creates the document)
pub async fn update_doc(
    State(state): State<AppState>,
    Path(id): Path<String>,
    patch: Option<Json<UpdateDocRequest>>,
) -> Result<Json<DocIdResponse>> {
    if id.is_empty() {
        return Err(AppError::Validation("id required".to_string()));
    }
    let patch = patch.map(|Json(p)| p).unwrap_or_default();

    let mut doc = state
        .repo
        .get(&id)
        .await
        .unwrap_or_else(|| Doc::new(id.clone(), "", ""));
    if let Some(title) = patch.title {
        doc.title = title;
    }
    if let Some(content) = patch.content {
        doc.content = content;
    }
    if doc.title.is_empty() {
        return Err(AppError::Validation("title required".to_string()));
    }

    state.repo.update(doc.clone()).await?;

    metrics::KB_DOCS_UPDATED.inc();
    notify_upsert(&state.embedding, &doc.id, &doc.title, &doc.content);

    Ok(Json(DocIdResponse { id: doc.id }))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDocRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Delete a document (idempotent)
pub async fn delete_doc(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    if id.is_empty() {
        return Err(AppError::Validation("id required".to_string()));
    }

    state.repo.delete(&id).await?;

    metrics::KB_DOCS_DELETED.inc();
    notify_delete(&state.embedding, &id);

    Ok(StatusCode::NO_CONTENT)
}

/// Search documents
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let q = params.q.unwrap_or_default();
    let offset = params.offset.unwrap_or(0);

    let mut limit = state.search_default_limit;
    if let Some(n) = params.limit {
        if n > 0 {
            limit = (n as usize).min(state.search_max_limit);
        }
    }

    // The repository always returns the top of the ranking; pagination is a
    // slice over it.
    let (ranked, total) = state.repo.search(&q, offset.saturating_add(limit)).await?;
    let items: Vec<SearchItem> = ranked.into_iter().skip(offset).collect();
    let returned = items.len();

    metrics::KB_SEARCH_REQUESTS.inc();
    metrics::KB_SEARCH_HITS.inc_by(returned as f64);

    let next_offset = if offset + returned < total {
        Some(offset + returned)
    } else {
        None
    };

    Ok(Json(SearchResponse {
        items,
        returned,
        total,
        next_offset,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
    pub returned: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<usize>,
}

/// KB backend diagnostics
pub async fn kb_info(State(state): State<AppState>) -> Json<KbInfo> {
    Json(state.repo.info().await)
}
