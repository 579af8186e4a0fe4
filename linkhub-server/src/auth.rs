//! Auth gate for the link routes.
//!
//! Every `/api/links` request carries `Authorization: Bearer <token>`. The
//! middleware resolves the token to an owner id through a [`TokenVerifier`]
//! and attaches it to the request as an [`AuthUser`] extension; requests
//! without a resolvable token are rejected with 401 before reaching any
//! handler. Verification is stateless — no session state lives in-process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use linkhub_core::LinkHubError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::http::HttpState;

/// Authenticated owner identity, injected by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

/// Resolves bearer tokens to owner identities.
///
/// Token issuance (register/login) belongs to the external credential
/// store; the server only consumes tokens it has issued.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Uuid, LinkHubError>;
}

/// Production verifier backed by the `sessions` table.
pub struct PgTokenVerifier {
    pool: PgPool,
}

impl PgTokenVerifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenVerifier for PgTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Uuid, LinkHubError> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM sessions \
             WHERE token = $1 AND (expires_at IS NULL OR expires_at > now())",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((user_id,)) => Ok(user_id),
            None => Err(LinkHubError::Unauthenticated(
                "invalid or expired token".to_string(),
            )),
        }
    }
}

/// Fixed token→owner map for tests and `--memory` dev mode.
#[derive(Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Uuid>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, owner: Uuid) -> Self {
        self.tokens.insert(token.into(), owner);
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Uuid, LinkHubError> {
        self.tokens.get(token).copied().ok_or_else(|| {
            LinkHubError::Unauthenticated("invalid or expired token".to_string())
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn unauthenticated(msg: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": msg,
            "status": "error",
        })),
    )
        .into_response()
}

/// Axum middleware guarding the link routes.
pub async fn require_auth(
    State(state): State<Arc<HttpState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&req) {
        Some(t) => t.to_string(),
        None => return unauthenticated("missing bearer token"),
    };

    match state.verifier.verify(&token).await {
        Ok(owner) => {
            req.extensions_mut().insert(AuthUser(owner));
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("token rejected: {}", e);
            unauthenticated("invalid or expired token")
        }
    }
}
