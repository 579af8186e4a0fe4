//! Process-wide auth state with explicit init/teardown.
//!
//! The bearer token is cached on disk so the user stays signed in across
//! sessions. [`AuthSession::init`] restores and validates the cached token
//! against the credential store; a rejected token is discarded, the same
//! way the browser client drops a stale localStorage entry.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::api::{LinkHubApi, UserProfile};

pub struct AuthSession {
    api: Arc<LinkHubApi>,
    token_path: PathBuf,
    user: Option<UserProfile>,
}

impl AuthSession {
    /// `token_path` may contain `~`; it is shell-expanded.
    pub fn new(api: Arc<LinkHubApi>, token_path: &str) -> Self {
        let token_path = PathBuf::from(shellexpand::tilde(token_path).into_owned());
        Self {
            api,
            token_path,
            user: None,
        }
    }

    /// Restore the persisted token, if any, and validate it. Returns whether
    /// the session ended up authenticated.
    pub async fn init(&mut self) -> Result<bool> {
        let token = match std::fs::read_to_string(&self.token_path) {
            Ok(t) => t.trim().to_string(),
            Err(_) => return Ok(false),
        };
        if token.is_empty() {
            return Ok(false);
        }

        self.api.set_token(Some(token));
        match self.api.me().await {
            Ok(user) => {
                self.user = Some(user);
                Ok(true)
            }
            Err(e) => {
                tracing::debug!("cached token rejected: {}", e);
                self.discard_token();
                Ok(false)
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let auth = self.api.login(email, password).await?;
        self.store_token(&auth.token)?;
        self.user = Some(UserProfile {
            id: None,
            name: auth.name,
            email: auth.email,
        });
        Ok(())
    }

    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> Result<()> {
        let auth = self.api.register(name, email, password).await?;
        self.store_token(&auth.token)?;
        self.user = Some(UserProfile {
            id: None,
            name: auth.name,
            email: auth.email,
        });
        Ok(())
    }

    /// Tear down both in-memory and on-disk state.
    pub fn logout(&mut self) {
        self.discard_token();
        self.user = None;
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.token().is_some()
    }

    fn store_token(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.token_path, token)?;
        self.api.set_token(Some(token.to_string()));
        Ok(())
    }

    fn discard_token(&mut self) {
        self.api.set_token(None);
        if self.token_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.token_path) {
                tracing::warn!("failed to remove cached token: {}", e);
            }
        }
    }
}
