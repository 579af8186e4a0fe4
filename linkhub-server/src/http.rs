//! LinkHub HTTP REST API
//!
//! Axum-based HTTP server exposing the link repository over HTTP.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a
//! pure inner function. The inner functions are directly testable without
//! axum dispatch machinery, which improves coverage accuracy under tarpaulin.
//!
//! Endpoints:
//! - GET    /health              — health check with DB status
//! - GET    /version             — server version info
//! - GET    /api/links           — filtered listing (auth required)
//! - GET    /api/links/projects  — distinct project labels (auth required)
//! - POST   /api/links           — create a link (auth required)
//! - DELETE /api/links/:id       — delete a link (auth required)

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{middleware, Extension, Json, Router};
use linkhub_core::config::HttpConfig;
use linkhub_core::{LinkHubError, NewLink};
use serde::Deserialize;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::{self, AuthUser, TokenVerifier};
use crate::query::LinkFilter;
use crate::store::LinkStore;

/// Shared state for all HTTP handlers.
///
/// `pool` is `None` in `--memory` mode; the health endpoint reports
/// accordingly.
pub struct HttpState {
    pub store: Arc<dyn LinkStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub pool: Option<PgPool>,
}

/// Build the Axum router with all endpoints. Link routes sit behind the
/// auth gate; health and version stay open.
pub fn build_router(state: Arc<HttpState>) -> Router {
    let protected = Router::new()
        .route("/api/links", get(list_links_handler).post(create_link_handler))
        .route("/api/links/projects", get(list_projects_handler))
        .route("/api/links/:id", delete(delete_link_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .merge(protected)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    http: &HttpConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", http.host, http.port);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("LinkHub API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ListLinksParams {
    pub project: Option<String>,
    pub search: Option<String>,
}

/// Create payload as received from the client. Unknown fields — including
/// any client-supplied `owner` — are dropped by serde; the owner always
/// comes from the auth gate.
#[derive(Debug, Deserialize, Default)]
pub struct CreateLinkRequest {
    pub url: Option<String>,
    pub title: Option<String>,
    pub project: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Map an error variant onto its HTTP status.
pub fn error_status(err: &LinkHubError) -> StatusCode {
    match err {
        LinkHubError::Validation(_) => StatusCode::BAD_REQUEST,
        LinkHubError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        LinkHubError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        LinkHubError::NotFound(_) => StatusCode::NOT_FOUND,
        LinkHubError::Database(_) | LinkHubError::Config(_) | LinkHubError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: &LinkHubError) -> (StatusCode, serde_json::Value) {
    let status = error_status(err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("request failed: {}", err);
    }
    (
        status,
        serde_json::json!({
            "error": err.to_string(),
            "status": "error",
        }),
    )
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check — reports DB status, or in-memory mode.
pub async fn health_inner(pool: Option<&PgPool>) -> (StatusCode, serde_json::Value) {
    let database = match pool {
        None => "in-memory".to_string(),
        Some(pool) => match linkhub_core::db::health_check(pool).await {
            Ok(v) => v,
            Err(e) => {
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    serde_json::json!({
                        "status": "unhealthy",
                        "error": e.to_string(),
                    }),
                );
            }
        },
    };

    (
        StatusCode::OK,
        serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
        }),
    )
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "linkhub/1",
    })
}

/// Inner listing — builds a filter scoped to the authenticated owner.
pub async fn list_links_inner(
    store: &dyn LinkStore,
    owner: Uuid,
    params: ListLinksParams,
) -> (StatusCode, serde_json::Value) {
    let filter = LinkFilter::new(owner, params.project.as_deref(), params.search.as_deref());
    match store.list(&filter).await {
        Ok(links) => match serde_json::to_value(&links) {
            Ok(body) => (StatusCode::OK, body),
            Err(e) => error_response(&LinkHubError::Validation(e.to_string())),
        },
        Err(e) => error_response(&e),
    }
}

/// Inner projects listing — distinct labels for the filter sidebar.
pub async fn list_projects_inner(
    store: &dyn LinkStore,
    owner: Uuid,
) -> (StatusCode, serde_json::Value) {
    match store.projects(owner).await {
        Ok(projects) => (StatusCode::OK, serde_json::json!(projects)),
        Err(e) => error_response(&e),
    }
}

/// Inner create — validates required fields, stamps the owner, returns 201.
pub async fn create_link_inner(
    store: &dyn LinkStore,
    owner: Uuid,
    req: CreateLinkRequest,
) -> (StatusCode, serde_json::Value) {
    let url = match req.url.filter(|u| !u.trim().is_empty()) {
        Some(u) => u,
        None => {
            return error_response(&LinkHubError::Validation("url is required".to_string()));
        }
    };
    let title = match req.title.filter(|t| !t.trim().is_empty()) {
        Some(t) => t,
        None => {
            return error_response(&LinkHubError::Validation("title is required".to_string()));
        }
    };

    let new = NewLink {
        url,
        title,
        project: req.project,
        description: req.description,
        tags: req.tags,
    };

    match store.create(owner, new).await {
        Ok(link) => match serde_json::to_value(&link) {
            Ok(body) => (StatusCode::CREATED, body),
            Err(e) => error_response(&LinkHubError::Validation(e.to_string())),
        },
        Err(e) => error_response(&e),
    }
}

/// Inner delete — hard-deletes after the ownership check.
pub async fn delete_link_inner(
    store: &dyn LinkStore,
    owner: Uuid,
    id: Uuid,
) -> (StatusCode, serde_json::Value) {
    match store.delete(owner, id).await {
        Ok(id) => (
            StatusCode::OK,
            serde_json::json!({
                "id": id,
                "message": "Link removed",
            }),
        ),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.pool.as_ref()).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn list_links_handler(
    State(state): State<Arc<HttpState>>,
    Extension(AuthUser(owner)): Extension<AuthUser>,
    Query(params): Query<ListLinksParams>,
) -> impl IntoResponse {
    let (status, body) = list_links_inner(state.store.as_ref(), owner, params).await;
    (status, Json(body))
}

pub async fn list_projects_handler(
    State(state): State<Arc<HttpState>>,
    Extension(AuthUser(owner)): Extension<AuthUser>,
) -> impl IntoResponse {
    let (status, body) = list_projects_inner(state.store.as_ref(), owner).await;
    (status, Json(body))
}

pub async fn create_link_handler(
    State(state): State<Arc<HttpState>>,
    Extension(AuthUser(owner)): Extension<AuthUser>,
    Json(req): Json<CreateLinkRequest>,
) -> impl IntoResponse {
    let (status, body) = create_link_inner(state.store.as_ref(), owner, req).await;
    (status, Json(body))
}

pub async fn delete_link_handler(
    State(state): State<Arc<HttpState>>,
    Extension(AuthUser(owner)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let (status, body) = delete_link_inner(state.store.as_ref(), owner, id).await;
    (status, Json(body))
}

// ============================================================================
// Unit Tests — call inner functions directly against the in-memory store
// ============================================================================
