use async_trait::async_trait;
use linkhub_core::{normalize_project, Link, LinkHubError, NewLink};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::query::LinkFilter;
use crate::store::LinkStore;

const LINK_COLUMNS: &str = "id, owner, url, title, project, description, tags, created_at";

/// Production store backed by the `links` table (see schema.sql).
pub struct PgLinkStore {
    pool: PgPool,
}

impl PgLinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn create(&self, owner: Uuid, new: NewLink) -> Result<Link, LinkHubError> {
        let project = normalize_project(new.project.as_deref());
        let link = sqlx::query_as::<_, Link>(&format!(
            "INSERT INTO links (owner, url, title, project, description, tags) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(owner)
        .bind(&new.url)
        .bind(&new.title)
        .bind(&project)
        .bind(&new.description)
        .bind(&new.tags)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("created link {} for owner {}", link.id, owner);
        Ok(link)
    }

    async fn list(&self, filter: &LinkFilter) -> Result<Vec<Link>, LinkHubError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {LINK_COLUMNS} FROM links WHERE owner = "));
        qb.push_bind(filter.owner);

        if let Some(project) = &filter.project {
            qb.push(" AND project = ");
            qb.push_bind(project);
        }
        if let Some(search) = &filter.search {
            qb.push(" AND title ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(search)));
        }
        qb.push(" ORDER BY created_at DESC");

        let links = qb.build_query_as::<Link>().fetch_all(&self.pool).await?;
        Ok(links)
    }

    async fn projects(&self, owner: Uuid) -> Result<Vec<String>, LinkHubError> {
        let projects: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT project FROM links WHERE owner = $1 ORDER BY project",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Uuid, LinkHubError> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT owner FROM links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Err(LinkHubError::NotFound(format!("no link with id {}", id))),
            Some((record_owner,)) if record_owner != owner => Err(LinkHubError::Unauthorized(
                "link belongs to another user".to_string(),
            )),
            Some(_) => {
                // The mutation stands on its own: owner-scoped DELETE, and if
                // the row vanished since the check above, report NotFound
                // rather than a phantom success.
                let deleted: Option<(Uuid,)> = sqlx::query_as(
                    "DELETE FROM links WHERE id = $1 AND owner = $2 RETURNING id",
                )
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;

                match deleted {
                    Some(_) => {
                        tracing::info!("deleted link {} for owner {}", id, owner);
                        Ok(id)
                    }
                    None => Err(LinkHubError::NotFound(format!("no link with id {}", id))),
                }
            }
        }
    }
}
