//! SQLite access key repository implementation.

use chrono::Utc;
use firerange_core::repository::access_key::AccessKeyRepository;
use firerange_types::access::{AccessKey, Role};
use firerange_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_optional_datetime, parse_uuid};

/// SQLite-backed implementation of `AccessKeyRepository`.
pub struct SqliteAccessKeyRepository {
    pool: DatabasePool,
}

impl SqliteAccessKeyRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct AccessKeyRow {
    id: String,
    name: String,
    key_hash: String,
    role: String,
    tenant_id: Option<String>,
    client_id: Option<String>,
    created_at: String,
    last_used_at: Option<String>,
}

impl AccessKeyRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            key_hash: row.try_get("key_hash")?,
            role: row.try_get("role")?,
            tenant_id: row.try_get("tenant_id")?,
            client_id: row.try_get("client_id")?,
            created_at: row.try_get("created_at")?,
            last_used_at: row.try_get("last_used_at")?,
        })
    }

    fn into_key(self) -> Result<AccessKey, RepositoryError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(AccessKey {
            id: parse_uuid(&self.id)?,
            name: self.name,
            key_hash: self.key_hash,
            role,
            tenant_id: self
                .tenant_id
                .map(|id| id.parse())
                .transpose()
                .map_err(|e| RepositoryError::Query(format!("invalid tenant id: {e}")))?,
            client_id: self
                .client_id
                .map(|id| id.parse())
                .transpose()
                .map_err(|e| RepositoryError::Query(format!("invalid client id: {e}")))?,
            created_at: parse_datetime(&self.created_at)?,
            last_used_at: parse_optional_datetime(self.last_used_at)?,
        })
    }
}

impl AccessKeyRepository for SqliteAccessKeyRepository {
    async fn create(&self, key: &AccessKey) -> Result<AccessKey, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO access_keys (id, name, key_hash, role, tenant_id, client_id, created_at, last_used_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(key.id.to_string())
        .bind(&key.name)
        .bind(&key.key_hash)
        .bind(key.role.to_string())
        .bind(key.tenant_id.as_ref().map(|id| id.to_string()))
        .bind(key.client_id.as_ref().map(|id| id.to_string()))
        .bind(format_datetime(&key.created_at))
        .bind(key.last_used_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(key.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict("key hash already exists".to_string()))
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_by_hash(&self, key_hash: &str) -> Result<Option<AccessKey>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM access_keys WHERE key_hash = ?")
            .bind(key_hash)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let key_row =
                    AccessKeyRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(key_row.into_key()?))
            }
            None => Ok(None),
        }
    }

    async fn touch(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE access_keys SET last_used_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
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
mod tests {
    use super::*;
    use crate::sqlite::pool::test_pool;
    use crate::sqlite::tenant::{make_tenant, SqliteTenantRepository};
    use firerange_core::repository::tenant::TenantRepository;
    use firerange_types::tenant::TenantId;

    fn make_key(hash: &str, role: Role, tenant_id: Option<TenantId>) -> AccessKey {
        AccessKey {
            id: Uuid::now_v7(),
            name: "balcão".to_string(),
            key_hash: hash.to_string(),
            role,
            tenant_id,
            client_id: None,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_lookup_touch() {
        let pool = test_pool().await;
        let tenant = make_tenant("alvo");
        SqliteTenantRepository::new(pool.clone()).create(&tenant).await.unwrap();
        let repo = SqliteAccessKeyRepository::new(pool);

        let key = make_key("abc123", Role::Operator, Some(tenant.id.clone()));
        repo.create(&key).await.unwrap();

        let loaded = repo.get_by_hash("abc123").await.unwrap().unwrap();
        assert_eq!(loaded.role, Role::Operator);
        assert_eq!(loaded.tenant_id, Some(tenant.id));
        assert!(loaded.last_used_at.is_none());
        assert!(repo.get_by_hash("other").await.unwrap().is_none());

        repo.touch(&key.id).await.unwrap();
        let loaded = repo.get_by_hash("abc123").await.unwrap().unwrap();
        assert!(loaded.last_used_at.is_some());
        assert!(matches!(repo.touch(&Uuid::now_v7()).await, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_super_admin_key_without_tenant() {
        let repo = SqliteAccessKeyRepository::new(test_pool().await);
        repo.create(&make_key("root", Role::SuperAdmin, None)).await.unwrap();
        let loaded = repo.get_by_hash("root").await.unwrap().unwrap();
        assert_eq!(loaded.role, Role::SuperAdmin);
        assert!(loaded.tenant_id.is_none());

        assert!(matches!(
            repo.create(&make_key("root", Role::SuperAdmin, None)).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_keys_die_with_their_tenant() {
        let pool = test_pool().await;
        let tenants = SqliteTenantRepository::new(pool.clone());
        let tenant = make_tenant("alvo");
        tenants.create(&tenant).await.unwrap();
        let repo = SqliteAccessKeyRepository::new(pool);
        repo.create(&make_key("adm", Role::Admin, Some(tenant.id.clone()))).await.unwrap();

        tenants.delete(&tenant.id).await.unwrap();
        assert!(repo.get_by_hash("adm").await.unwrap().is_none());
    }
}
