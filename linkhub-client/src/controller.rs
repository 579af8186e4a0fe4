//! Dashboard data controller.
//!
//! State machine over the dashboard view state: debounces search input,
//! issues fetches, and applies optimistic local mutations with rollback.
//!
//! Transition rules:
//! - a search/project change reschedules a single pending fetch; only the
//!   last scheduled fetch per burst of typing fires, carrying the final
//!   filter values;
//! - a successful fetch replaces `links` wholesale, a failed one leaves
//!   them untouched and emits an error event;
//! - create prepends the server-acknowledged link (optimistic-on-success);
//! - delete removes the target immediately and restores the exact prior
//!   snapshot if the server call fails.
//!
//! Overlapping in-flight fetches are not sequence-tagged: last-resolved
//! wins, so a slow stale response can briefly overwrite a newer one until
//! the next fetch lands. The debounce makes overlap rare in practice, and
//! dropping stale responses would change observable behavior.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use linkhub_core::{Link, NewLink, ALL_PROJECTS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::LinkHubApi;

/// User-visible feedback, the stand-in for toast notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Toast(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Most-recent-first, mirroring the server ordering.
    pub links: Vec<Link>,
    /// Always led by the `"All Projects"` sentinel.
    pub projects: Vec<String>,
    pub selected_project: String,
    pub search_term: String,
    pub loading: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            links: Vec::new(),
            projects: vec![ALL_PROJECTS.to_string()],
            selected_project: ALL_PROJECTS.to_string(),
            search_term: String::new(),
            loading: false,
        }
    }
}

pub struct DashboardController {
    api: Arc<LinkHubApi>,
    state: Arc<Mutex<DashboardState>>,
    events: mpsc::UnboundedSender<UiEvent>,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DashboardController {
    /// Returns the controller plus the receiver for UI feedback events.
    pub fn new(
        api: Arc<LinkHubApi>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                api,
                state: Arc::new(Mutex::new(DashboardState::default())),
                events: tx,
                debounce,
                pending: None,
            },
            rx,
        )
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().expect("dashboard state poisoned")
    }

    /// Cloned view of the current state, for rendering.
    pub fn snapshot(&self) -> DashboardState {
        self.lock().clone()
    }

    /// Immediate fetch — used on mount / on becoming authenticated.
    pub async fn refresh(&self) {
        Self::do_refresh(self.api.clone(), self.state.clone(), self.events.clone()).await;
    }

    /// Record a keystroke and (re)schedule the debounced fetch.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.lock().search_term = term.into();
        self.schedule_refresh();
    }

    /// Switch the project filter; debounced like search input.
    pub fn select_project(&mut self, project: impl Into<String>) {
        self.lock().selected_project = project.into();
        self.schedule_refresh();
    }

    /// Cancel any pending debounce timer (leaving the view).
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    fn schedule_refresh(&mut self) {
        // A newer keystroke cancels the previously scheduled fetch, so at
        // most one fetch fires per burst and it carries the final term.
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        let api = self.api.clone();
        let state = self.state.clone();
        let events = self.events.clone();
        let delay = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Self::do_refresh(api, state, events).await;
        }));
    }

    async fn do_refresh(
        api: Arc<LinkHubApi>,
        state: Arc<Mutex<DashboardState>>,
        events: mpsc::UnboundedSender<UiEvent>,
    ) {
        let (project, search) = {
            let mut s = state.lock().expect("dashboard state poisoned");
            s.loading = true;
            (s.selected_project.clone(), s.search_term.trim().to_string())
        };

        let result = futures::future::try_join(
            api.list_links(Some(&project), Some(&search)),
            api.list_projects(),
        )
        .await;

        let mut s = state.lock().expect("dashboard state poisoned");
        match result {
            Ok((links, projects)) => {
                s.links = links;
                s.projects = std::iter::once(ALL_PROJECTS.to_string())
                    .chain(projects.into_iter().filter(|p| p != ALL_PROJECTS))
                    .collect();
            }
            Err(e) => {
                tracing::warn!("dashboard fetch failed: {}", e);
                let _ = events.send(UiEvent::Error(format!("Could not fetch data: {}", e)));
            }
        }
        s.loading = false;
    }

    /// Create a link. The local list is only touched after the server
    /// acknowledges, then the new link is prepended without a refetch.
    pub async fn add_link(&self, new: NewLink) {
        match self.api.create_link(&new).await {
            Ok(link) => {
                {
                    let mut s = self.lock();
                    if !s.projects.contains(&link.project) {
                        s.projects.push(link.project.clone());
                    }
                    s.links.insert(0, link);
                }
                let _ = self.events.send(UiEvent::Toast("Link added!".to_string()));
            }
            Err(e) => {
                let _ = self
                    .events
                    .send(UiEvent::Error(format!("Failed to add link: {}", e)));
            }
        }
    }

    /// Optimistic delete: snapshot, remove locally, confirm with the
    /// server, restore the snapshot verbatim on failure.
    pub async fn delete_link(&self, id: Uuid) {
        let snapshot = {
            let mut s = self.lock();
            let snapshot = s.links.clone();
            s.links.retain(|l| l.id != id);
            snapshot
        };

        match self.api.delete_link(id).await {
            Ok(_) => {
                let _ = self.events.send(UiEvent::Toast("Link deleted!".to_string()));
                self.refresh().await;
            }
            Err(e) => {
                self.lock().links = snapshot;
                let _ = self
                    .events
                    .send(UiEvent::Error(format!("Failed to delete link: {}", e)));
            }
        }
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
