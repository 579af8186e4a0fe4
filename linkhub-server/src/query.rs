//! Query filter engine.
//!
//! Translates client-supplied filter parameters into a repository query
//! scoped to one owner. The sentinel project `"All Projects"` and blank
//! search terms apply no constraint. [`LinkFilter::matches`] is the single
//! source of truth for filter semantics; the Postgres store translates the
//! same filter into SQL.

use linkhub_core::Link;
use uuid::Uuid;

pub use linkhub_core::ALL_PROJECTS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFilter {
    pub owner: Uuid,
    pub project: Option<String>,
    pub search: Option<String>,
}

impl LinkFilter {
    /// Build a filter from raw query parameters. `owner` always comes from
    /// the auth gate, never from client data.
    pub fn new(owner: Uuid, project: Option<&str>, search: Option<&str>) -> Self {
        let project = project
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != ALL_PROJECTS)
            .map(str::to_string);

        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self { owner, project, search }
    }

    /// Owner-only filter (no project or search constraint).
    pub fn all(owner: Uuid) -> Self {
        Self { owner, project: None, search: None }
    }

    /// Whether `link` satisfies this filter. Search is a case-insensitive
    /// substring match on the title.
    pub fn matches(&self, link: &Link) -> bool {
        if link.owner != self.owner {
            return false;
        }
        if let Some(project) = &self.project {
            if &link.project != project {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !link.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn link(owner: Uuid, title: &str, project: &str) -> Link {
        Link {
            id: Uuid::new_v4(),
            owner,
            url: "https://example.com".to_string(),
            title: title.to_string(),
            project: project.to_string(),
            description: None,
            tags: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sentinel_applies_no_project_constraint() {
        let owner = Uuid::new_v4();
        let filter = LinkFilter::new(owner, Some(ALL_PROJECTS), None);
        assert_eq!(filter.project, None);
        assert!(filter.matches(&link(owner, "anything", "Rust")));
    }

    #[test]
    fn test_blank_parameters_apply_no_constraint() {
        let owner = Uuid::new_v4();
        let filter = LinkFilter::new(owner, Some("  "), Some("   "));
        assert_eq!(filter, LinkFilter::all(owner));
    }

    #[test]
    fn test_project_exact_match() {
        let owner = Uuid::new_v4();
        let filter = LinkFilter::new(owner, Some("Rust"), None);
        assert!(filter.matches(&link(owner, "borrow checker", "Rust")));
        assert!(!filter.matches(&link(owner, "borrow checker", "rust")));
        assert!(!filter.matches(&link(owner, "borrow checker", "General")));
    }

    #[test]
    fn test_search_case_insensitive_substring() {
        let owner = Uuid::new_v4();
        let filter = LinkFilter::new(owner, None, Some("setup"));
        assert!(filter.matches(&link(owner, "Setup Guide", "General")));
        assert!(filter.matches(&link(owner, "cluster SETUP notes", "General")));
        assert!(!filter.matches(&link(owner, "Teardown Guide", "General")));
    }

    #[test]
    fn test_search_trimmed() {
        let owner = Uuid::new_v4();
        let filter = LinkFilter::new(owner, None, Some("  guide  "));
        assert_eq!(filter.search.as_deref(), Some("guide"));
        assert!(filter.matches(&link(owner, "Setup Guide", "General")));
    }

    #[test]
    fn test_owner_scoping_always_applies() {
        let owner = Uuid::new_v4();
        let filter = LinkFilter::all(owner);
        assert!(!filter.matches(&link(Uuid::new_v4(), "Setup Guide", "General")));
    }

    #[test]
    fn test_project_and_search_combine() {
        let owner = Uuid::new_v4();
        let filter = LinkFilter::new(owner, Some("Rust"), Some("async"));
        assert!(filter.matches(&link(owner, "Async book", "Rust")));
        assert!(!filter.matches(&link(owner, "Async book", "General")));
        assert!(!filter.matches(&link(owner, "Sync book", "Rust")));
    }
}
