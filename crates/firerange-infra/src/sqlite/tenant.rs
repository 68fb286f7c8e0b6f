//! SQLite tenant repository implementation.

use firerange_core::repository::tenant::TenantRepository;
use firerange_types::error::RepositoryError;
use firerange_types::tenant::{Tenant, TenantId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `TenantRepository`.
pub struct SqliteTenantRepository {
    pool: DatabasePool,
}

impl SqliteTenantRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct TenantRow {
    id: String,
    slug: String,
    name: String,
    created_at: String,
}

impl TenantRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_tenant(self) -> Result<Tenant, RepositoryError> {
        let id = self
            .id
            .parse::<TenantId>()
            .map_err(|e| RepositoryError::Query(format!("invalid tenant id: {e}")))?;

        Ok(Tenant {
            id,
            slug: self.slug,
            name: self.name,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<Tenant, RepositoryError> {
    TenantRow::from_row(row)
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .into_tenant()
}

impl TenantRepository for SqliteTenantRepository {
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, RepositoryError> {
        let result = sqlx::query("INSERT INTO tenants (id, slug, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(tenant.id.to_string())
            .bind(&tenant.slug)
            .bind(&tenant.name)
            .bind(format_datetime(&tenant.created_at))
            .execute(&self.pool.writer)
            .await;

        match result {
            Ok(_) => Ok(tenant.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict(format!(
                    "slug '{}' already exists",
                    tenant.slug
                )))
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM tenants WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(map_row).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM tenants WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(map_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Tenant>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM tenants ORDER BY slug")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(map_row).collect()
    }

    async fn delete(&self, id: &TenantId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn make_tenant(slug: &str) -> Tenant {
    Tenant {
        id: TenantId::new(),
        slug: slug.to_string(),
        name: format!("Clube {slug}"),
        created_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_pool;

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = SqliteTenantRepository::new(test_pool().await);
        let tenant = make_tenant("alvo-certo");
        repo.create(&tenant).await.unwrap();

        let by_id = repo.get_by_id(&tenant.id).await.unwrap().unwrap();
        assert_eq!(by_id.slug, "alvo-certo");
        assert_eq!(by_id.name, "Clube alvo-certo");

        let by_slug = repo.get_by_slug("alvo-certo").await.unwrap().unwrap();
        assert_eq!(by_slug.id, tenant.id);
        assert!(repo.get_by_slug("outro").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let repo = SqliteTenantRepository::new(test_pool().await);
        repo.create(&make_tenant("alvo")).await.unwrap();
        let result = repo.create(&make_tenant("alvo")).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_ordered_by_slug() {
        let repo = SqliteTenantRepository::new(test_pool().await);
        repo.create(&make_tenant("zulu")).await.unwrap();
        repo.create(&make_tenant("alfa")).await.unwrap();

        let slugs: Vec<String> = repo.list().await.unwrap().into_iter().map(|t| t.slug).collect();
        assert_eq!(slugs, vec!["alfa", "zulu"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = SqliteTenantRepository::new(test_pool().await);
        let tenant = make_tenant("alvo");
        repo.create(&tenant).await.unwrap();

        repo.delete(&tenant.id).await.unwrap();
        assert!(repo.get_by_id(&tenant.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(&tenant.id).await, Err(RepositoryError::NotFound)));
    }
}
