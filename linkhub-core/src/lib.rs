pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::LinkHubConfig;
pub use error::LinkHubError;
pub use models::link::{normalize_project, Link, NewLink, ALL_PROJECTS, DEFAULT_PROJECT};
