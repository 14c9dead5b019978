//! # Workspace HTTP Server
//!
//! Axum surface over the page store and the live-sync channels: page CRUD
//! for the editor, publish/rollback, template export/import, a render
//! endpoint for the storefront, and the two SSE channels (per-page preview,
//! global publish notifications).

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio_stream::{wrappers::errors::BroadcastStreamRecvError, wrappers::BroadcastStream, Stream, StreamExt};
use tower_http::cors::CorsLayer;
use tracing::warn;
use vitrine_document::{PageDocument, Section, Version};
use vitrine_renderer::{
    render_sections, CatalogProvider, EmptyCatalog, RenderContext, RenderedPage, RendererRegistry,
};

use crate::store::{PageStore, StoreError};
use crate::sync::SyncChannels;

/// Error type mapping store failures to JSON error responses
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(slug) => ServerError::NotFound(slug),
            StoreError::VersionNotFound { slug, index } => {
                ServerError::NotFound(format!("version {index} of {slug}"))
            }
            StoreError::AlreadyExists(slug) => ServerError::Conflict(slug),
            StoreError::InvalidSlug(slug) => ServerError::BadRequest(format!("invalid slug: {slug}")),
            StoreError::InvalidTemplate(msg) => {
                ServerError::BadRequest(format!("invalid template: {msg}"))
            }
            StoreError::Io(e) => ServerError::Internal(e.to_string()),
            StoreError::Json(e) => ServerError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

type ServerResult<T> = Result<T, ServerError>;

/// Shared state for all route handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PageStore>,
    pub channels: SyncChannels,
    pub registry: Arc<RendererRegistry>,
    pub catalog: Arc<dyn CatalogProvider + Send + Sync>,
}

impl AppState {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self {
            store,
            channels: SyncChannels::default(),
            registry: Arc::new(RendererRegistry::with_builtin_sections()),
            catalog: Arc::new(EmptyCatalog),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogProvider + Send + Sync>) -> Self {
        self.catalog = catalog;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/pages", get(list_pages))
        .route("/api/pages/:slug", get(get_page))
        .route("/api/pages/:slug/draft", put(save_draft))
        .route("/api/pages/:slug/publish", post(publish_page))
        .route("/api/pages/:slug/rollback", post(rollback_page))
        .route("/api/pages/:slug/export", get(export_template))
        .route("/api/pages/:slug/import", post(import_template))
        .route("/api/pages/:slug/render", get(render_page))
        .route("/api/pages/:slug/preview", get(preview_sse))
        .route("/api/events", get(events_sse))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Page endpoints ──────────────────────────────────────────────────

async fn list_pages(State(state): State<AppState>) -> ServerResult<Json<Vec<String>>> {
    Ok(Json(state.store.list_pages().await?))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    /// `live` (default) serves the published pointer; `draft` the working copy
    view: Option<String>,
}

/// Published page content as served to the storefront
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LivePage {
    slug: String,
    version_index: u32,
    published_at: DateTime<Utc>,
    sections: Vec<Section>,
}

async fn get_page(
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
    State(state): State<AppState>,
) -> ServerResult<Json<serde_json::Value>> {
    let document = state.store.load(&slug).await?;

    match query.view.as_deref() {
        Some("draft") => {
            let value = serde_json::to_value(&document)
                .map_err(|e| ServerError::Internal(e.to_string()))?;
            Ok(Json(value))
        }
        None | Some("live") => {
            let version = document
                .latest_version()
                .ok_or_else(|| ServerError::NotFound(format!("{slug} has no published version")))?;
            let live = LivePage {
                slug: document.slug.clone(),
                version_index: version.version_index,
                published_at: version.published_at,
                sections: version.sections.clone(),
            };
            let value =
                serde_json::to_value(&live).map_err(|e| ServerError::Internal(e.to_string()))?;
            Ok(Json(value))
        }
        Some(other) => Err(ServerError::BadRequest(format!("unknown view: {other}"))),
    }
}

#[derive(Debug, Deserialize)]
struct SaveDraftRequest {
    sections: Vec<Section>,
}

async fn save_draft(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SaveDraftRequest>,
) -> ServerResult<Json<PageDocument>> {
    let document = state.store.save_draft(&slug, request.sections).await?;

    // Keep any open preview surface on the freshest draft
    state.channels.push_draft(&slug, document.clone());

    Ok(Json(document))
}

async fn publish_page(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> ServerResult<Json<Version>> {
    let version = state.store.publish(&slug).await?;

    state.channels.notify_published(&slug);
    state.channels.signal_live(&slug);

    Ok(Json(version))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RollbackRequest {
    version_index: u32,
}

async fn rollback_page(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<RollbackRequest>,
) -> ServerResult<Json<Version>> {
    let version = state.store.rollback(&slug, request.version_index).await?;

    state.channels.notify_published(&slug);
    state.channels.signal_live(&slug);

    Ok(Json(version))
}

// ── Template endpoints ──────────────────────────────────────────────

async fn export_template(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> ServerResult<impl IntoResponse> {
    let bytes = state.store.export_template(&slug).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], bytes))
}

#[derive(Debug, Deserialize)]
struct ImportQuery {
    overwrite: Option<bool>,
}

async fn import_template(
    Path(slug): Path<String>,
    Query(query): Query<ImportQuery>,
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<PageDocument>> {
    let overwrite = query.overwrite.unwrap_or(false);
    let document = state.store.import_template(&body, &slug, overwrite).await?;
    Ok(Json(document))
}

// ── Render endpoint ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RenderQuery {
    /// `live` (default) renders the published pointer; `draft` the working copy
    mode: Option<String>,
}

async fn render_page(
    Path(slug): Path<String>,
    Query(query): Query<RenderQuery>,
    State(state): State<AppState>,
) -> ServerResult<Json<RenderedPage>> {
    let document = state.store.load(&slug).await?;

    let (sections, ctx) = match query.mode.as_deref() {
        Some("draft") => (
            document.sections.clone(),
            RenderContext::preview(state.catalog.as_ref()),
        ),
        None | Some("live") => {
            let version = document
                .latest_version()
                .ok_or_else(|| ServerError::NotFound(format!("{slug} has no published version")))?;
            (
                version.sections.clone(),
                RenderContext::live(state.catalog.as_ref()),
            )
        }
        Some(other) => return Err(ServerError::BadRequest(format!("unknown mode: {other}"))),
    };

    Ok(Json(render_sections(&state.registry, &sections, &ctx)))
}

// ── SSE channels ────────────────────────────────────────────────────

/// Preview stream for one page: the current draft immediately, then every
/// draft push and live signal for that slug.
async fn preview_sse(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.channels.subscribe_preview();

    // Page may not exist yet; the stream still opens and waits for pushes
    let initial = match state.store.load(&slug).await {
        Ok(document) => Some(crate::sync::PreviewMessage::Draft {
            slug: slug.clone(),
            document,
        }),
        Err(_) => None,
    };

    let initial_stream = tokio_stream::iter(initial.into_iter().filter_map(to_sse_event));

    let broadcast_stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(message) if message.slug() == slug => to_sse_event(message),
        Ok(_) => None, // another page's preview
        Err(BroadcastStreamRecvError::Lagged(missed)) => {
            warn!(missed, "preview subscriber lagged; continuing from newest");
            None
        }
    });

    let stream = initial_stream.chain(broadcast_stream);

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Global publish-notification stream: `{ slug, changedAt }` per change,
/// never content. Consumers refetch on receipt.
async fn events_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.channels.subscribe_publish();

    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(event) => to_sse_event(event),
        Err(BroadcastStreamRecvError::Lagged(missed)) => {
            warn!(missed, "publish subscriber lagged; continuing from newest");
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn to_sse_event<T: Serialize>(payload: T) -> Option<Result<Event, Infallible>> {
    match serde_json::to_string(&payload) {
        Ok(json) => Some(Ok(Event::default().data(json))),
        Err(error) => {
            warn!(%error, "failed to serialize SSE payload");
            None
        }
    }
}
