//! Client-side data layer for LinkHub.
//!
//! Mirrors what the browser dashboard does: an HTTP API client carrying the
//! bearer token ([`api::LinkHubApi`]), a process-wide auth session with
//! explicit init/teardown ([`session::AuthSession`]), and the dashboard
//! controller implementing debounced search and optimistic mutations
//! ([`controller::DashboardController`]).

pub mod api;
pub mod controller;
pub mod session;

pub use api::{ApiError, DeleteConfirmation, LinkHubApi};
pub use controller::{DashboardController, DashboardState, UiEvent};
pub use session::AuthSession;
