use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project label applied when a link is created without one.
pub const DEFAULT_PROJECT: &str = "General";

/// Client-side sentinel meaning "no project constraint" in list queries.
pub const ALL_PROJECTS: &str = "All Projects";

/// A saved bookmark, scoped to exactly one owner.
///
/// `owner` is stamped from the authenticated identity at creation and is
/// never editable. `project` is never empty in storage; blank input is
/// normalized to [`DEFAULT_PROJECT`] before insert.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Link {
    pub id: Uuid,
    pub owner: Uuid,
    pub url: String,
    pub title: String,
    pub project: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated creation payload. `owner`, `id` and `created_at` are supplied
/// by the store, never by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLink {
    pub url: String,
    pub title: String,
    pub project: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Collapse a missing or whitespace-only project label to [`DEFAULT_PROJECT`].
pub fn normalize_project(project: Option<&str>) -> String {
    match project.map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => DEFAULT_PROJECT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_project_absent() {
        assert_eq!(normalize_project(None), "General");
    }

    #[test]
    fn test_normalize_project_blank() {
        assert_eq!(normalize_project(Some("")), "General");
        assert_eq!(normalize_project(Some("   ")), "General");
        assert_eq!(normalize_project(Some("\t\n")), "General");
    }

    #[test]
    fn test_normalize_project_trims() {
        assert_eq!(normalize_project(Some("  Rust  ")), "Rust");
    }

    #[test]
    fn test_normalize_project_keeps_label() {
        assert_eq!(normalize_project(Some("Side Projects")), "Side Projects");
    }
}
