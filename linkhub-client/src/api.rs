//! HTTP client for the LinkHub REST API.
//!
//! The bearer token is attached to every request once set, matching the
//! browser client's axios interceptor. Auth endpoints (`/auth/*`) belong to
//! the external credential store and are consumed as opaque calls.

use std::sync::RwLock;
use std::time::Duration;

use linkhub_core::{Link, NewLink};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Confirmation body returned by `DELETE /api/links/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteConfirmation {
    pub id: Uuid,
    pub message: String,
}

/// Token plus profile fields returned by the credential store on
/// login/register. Kept lenient — the external service owns this shape.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Profile returned by `GET /api/auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

pub struct LinkHubApi {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl LinkHubApi {
    /// `base_url` is the API root including the `/api` prefix,
    /// e.g. `http://127.0.0.1:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().expect("token lock poisoned") = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    /// Turn a non-2xx response into [`ApiError::Api`], decoding the server's
    /// JSON error body when present.
    async fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = match resp.json::<serde_json::Value>().await {
            Ok(body) => body["error"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string(),
            Err(_) => "unknown error".to_string(),
        };
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // ------------------------------------------------------------------
    // Link routes
    // ------------------------------------------------------------------

    pub async fn list_links(
        &self,
        project: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Link>, ApiError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(project) = project {
            params.push(("project", project));
        }
        if let Some(search) = search {
            params.push(("search", search));
        }

        let resp = self
            .authorized(self.client.get(format!("{}/links", self.base_url)))
            .query(&params)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn list_projects(&self) -> Result<Vec<String>, ApiError> {
        let resp = self
            .authorized(self.client.get(format!("{}/links/projects", self.base_url)))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn create_link(&self, new: &NewLink) -> Result<Link, ApiError> {
        let resp = self
            .authorized(self.client.post(format!("{}/links", self.base_url)))
            .json(new)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn delete_link(&self, id: Uuid) -> Result<DeleteConfirmation, ApiError> {
        let resp = self
            .authorized(self.client.delete(format!("{}/links/{}", self.base_url, id)))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Liveness probe. `/health` lives at the server root, above the
    /// `/api` prefix.
    pub async fn health(&self) -> Result<serde_json::Value, ApiError> {
        let root = self.base_url.trim_end_matches("/api");
        let resp = self
            .client
            .get(format!("{}/health", root))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    // ------------------------------------------------------------------
    // Credential store passthroughs (external collaborator)
    // ------------------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let resp = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({"email": email, "password": password}))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let resp = self
            .client
            .post(format!("{}/auth/register", self.base_url))
            .json(&serde_json::json!({"name": name, "email": email, "password": password}))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        let resp = self
            .authorized(self.client.get(format!("{}/auth/me", self.base_url)))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}
