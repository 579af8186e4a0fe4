//! Link repository.
//!
//! [`LinkStore`] is the seam between the HTTP layer and persistence.
//! `PgLinkStore` is the production implementation; `MemoryLinkStore` backs
//! the test suites and `--memory` dev mode.

use async_trait::async_trait;
use linkhub_core::{Link, LinkHubError, NewLink};
use uuid::Uuid;

use crate::query::LinkFilter;

mod memory;
mod postgres;

pub use memory::MemoryLinkStore;
pub use postgres::PgLinkStore;

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Persist a new link. The owner is always the authenticated identity;
    /// `project` is normalized before storage. Returns the stored record
    /// with its generated id and timestamp.
    async fn create(&self, owner: Uuid, new: NewLink) -> Result<Link, LinkHubError>;

    /// Filtered listing, ordered by `created_at` descending.
    async fn list(&self, filter: &LinkFilter) -> Result<Vec<Link>, LinkHubError>;

    /// Distinct project labels used by the owner's links, sorted ascending.
    async fn projects(&self, owner: Uuid) -> Result<Vec<String>, LinkHubError>;

    /// Hard-delete by id. Unknown id → `NotFound`; known id under another
    /// owner → `Unauthorized`. The split deliberately discloses that the id
    /// exists: clients rely on 404 meaning "already gone" to treat repeated
    /// deletes as settled, while 401 tells them the request itself was bad.
    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Uuid, LinkHubError>;
}
