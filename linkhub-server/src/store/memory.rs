use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use linkhub_core::{normalize_project, Link, LinkHubError, NewLink};
use uuid::Uuid;

use crate::query::LinkFilter;
use crate::store::LinkStore;

/// In-memory store used by the test suites and `--memory` dev mode.
/// Links are kept in insertion order; listing reverses and re-sorts so the
/// ordering contract matches the Postgres implementation.
#[derive(Default)]
pub struct MemoryLinkStore {
    links: Mutex<Vec<Link>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn create(&self, owner: Uuid, new: NewLink) -> Result<Link, LinkHubError> {
        let link = Link {
            id: Uuid::new_v4(),
            owner,
            url: new.url,
            title: new.title,
            project: normalize_project(new.project.as_deref()),
            description: new.description,
            tags: new.tags,
            created_at: Utc::now(),
        };
        self.links
            .lock()
            .expect("link store poisoned")
            .push(link.clone());
        Ok(link)
    }

    async fn list(&self, filter: &LinkFilter) -> Result<Vec<Link>, LinkHubError> {
        let links = self.links.lock().expect("link store poisoned");
        // Newest-inserted first, then stable sort: insertion order breaks
        // created_at ties deterministically.
        let mut result: Vec<Link> = links.iter().rev().filter(|l| filter.matches(l)).cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn projects(&self, owner: Uuid) -> Result<Vec<String>, LinkHubError> {
        let links = self.links.lock().expect("link store poisoned");
        let mut projects: Vec<String> = links
            .iter()
            .filter(|l| l.owner == owner)
            .map(|l| l.project.clone())
            .collect();
        projects.sort();
        projects.dedup();
        Ok(projects)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Uuid, LinkHubError> {
        let mut links = self.links.lock().expect("link store poisoned");
        let index = links
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| LinkHubError::NotFound(format!("no link with id {}", id)))?;
        if links[index].owner != owner {
            return Err(LinkHubError::Unauthorized(
                "link belongs to another user".to_string(),
            ));
        }
        links.remove(index);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_link(title: &str, project: Option<&str>) -> NewLink {
        NewLink {
            url: "https://example.com".to_string(),
            title: title.to_string(),
            project: project.map(str::to_string),
            description: None,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_stamps_owner_and_defaults_project() {
        let store = MemoryLinkStore::new();
        let owner = Uuid::new_v4();
        let link = store.create(owner, new_link("Docs", Some("  "))).await.unwrap();
        assert_eq!(link.owner, owner);
        assert_eq!(link.project, "General");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryLinkStore::new();
        let owner = Uuid::new_v4();
        store.create(owner, new_link("first", None)).await.unwrap();
        store.create(owner, new_link("second", None)).await.unwrap();
        store.create(owner, new_link("third", None)).await.unwrap();

        let titles: Vec<String> = store
            .list(&LinkFilter::all(owner))
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_list_scoped_to_owner() {
        let store = MemoryLinkStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.create(alice, new_link("alice link", None)).await.unwrap();
        store.create(bob, new_link("bob link", None)).await.unwrap();

        let links = store.list(&LinkFilter::all(alice)).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "alice link");
    }

    #[tokio::test]
    async fn test_projects_distinct_sorted() {
        let store = MemoryLinkStore::new();
        let owner = Uuid::new_v4();
        store.create(owner, new_link("a", Some("Rust"))).await.unwrap();
        store.create(owner, new_link("b", Some("Articles"))).await.unwrap();
        store.create(owner, new_link("c", Some("Rust"))).await.unwrap();
        store.create(Uuid::new_v4(), new_link("d", Some("Other"))).await.unwrap();

        let projects = store.projects(owner).await.unwrap();
        assert_eq!(projects, vec!["Articles", "Rust"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_not_found() {
        let store = MemoryLinkStore::new();
        let err = store.delete(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, LinkHubError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_cross_owner_unauthorized_and_record_survives() {
        let store = MemoryLinkStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let link = store.create(alice, new_link("hers", None)).await.unwrap();

        let err = store.delete(bob, link.id).await.unwrap_err();
        assert!(matches!(err, LinkHubError::Unauthorized(_)));

        let remaining = store.list(&LinkFilter::all(alice)).await.unwrap();
        assert_eq!(remaining.len(), 1, "record must survive a cross-owner delete");
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = MemoryLinkStore::new();
        let owner = Uuid::new_v4();
        let link = store.create(owner, new_link("gone", None)).await.unwrap();
        let deleted = store.delete(owner, link.id).await.unwrap();
        assert_eq!(deleted, link.id);
        assert!(store.list(&LinkFilter::all(owner)).await.unwrap().is_empty());
    }
}
