//! SQLite client repository implementation.
//!
//! Every query is scoped by `tenant_id`; a client id from another tenant
//! behaves exactly like a missing one.

use firerange_core::repository::client::{ClientFilter, ClientRepository};
use firerange_types::client::{Client, ClientId};
use firerange_types::error::RepositoryError;
use firerange_types::tenant::TenantId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ClientRepository`.
pub struct SqliteClientRepository {
    pool: DatabasePool,
}

impl SqliteClientRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ClientRow {
    id: String,
    tenant_id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    document_number: Option<String>,
    notes: String,
    created_at: String,
    updated_at: String,
}

impl ClientRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            tenant_id: row.try_get("tenant_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            document_number: row.try_get("document_number")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_client(self) -> Result<Client, RepositoryError> {
        let id = self
            .id
            .parse::<ClientId>()
            .map_err(|e| RepositoryError::Query(format!("invalid client id: {e}")))?;
        let tenant_id = self
            .tenant_id
            .parse::<TenantId>()
            .map_err(|e| RepositoryError::Query(format!("invalid tenant id: {e}")))?;

        Ok(Client {
            id,
            tenant_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            document_number: self.document_number,
            notes: self.notes,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<Client, RepositoryError> {
    ClientRow::from_row(row)
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .into_client()
}

/// Escape LIKE wildcards so a search for "50%" matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl ClientRepository for SqliteClientRepository {
    async fn create(&self, client: &Client) -> Result<Client, RepositoryError> {
        sqlx::query(
            "INSERT INTO clients (id, tenant_id, name, email, phone, document_number, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(client.id.to_string())
        .bind(client.tenant_id.to_string())
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.document_number)
        .bind(&client.notes)
        .bind(format_datetime(&client.created_at))
        .bind(format_datetime(&client.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(client.clone())
    }

    async fn get(&self, tenant_id: &TenantId, id: &ClientId) -> Result<Option<Client>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM clients WHERE id = ? AND tenant_id = ?")
            .bind(id.to_string())
            .bind(tenant_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(map_row).transpose()
    }

    async fn list(
        &self,
        tenant_id: &TenantId,
        filter: Option<ClientFilter>,
    ) -> Result<Vec<Client>, RepositoryError> {
        let filter = filter.unwrap_or_default();

        let mut sql = String::from("SELECT * FROM clients WHERE tenant_id = ?");
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        if search.is_some() {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
        }

        let order = filter.sort_order.unwrap_or_default().as_sql();
        sql.push_str(&format!(" ORDER BY name COLLATE NOCASE {order}, created_at {order}"));
        // SQLite requires LIMIT before OFFSET; -1 means no limit.
        sql.push_str(" LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql).bind(tenant_id.to_string());
        if let Some(pattern) = search {
            query = query.bind(pattern);
        }
        let rows = query
            .bind(filter.limit.unwrap_or(-1))
            .bind(filter.offset.unwrap_or(0))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(map_row).collect()
    }

    async fn update(&self, client: &Client) -> Result<Client, RepositoryError> {
        let result = sqlx::query(
            "UPDATE clients SET name = ?, email = ?, phone = ?, document_number = ?, notes = ?, updated_at = ?
             WHERE id = ? AND tenant_id = ?",
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.document_number)
        .bind(&client.notes)
        .bind(format_datetime(&client.updated_at))
        .bind(client.id.to_string())
        .bind(client.tenant_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(client.clone())
    }

    async fn delete(&self, tenant_id: &TenantId, id: &ClientId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ? AND tenant_id = ?")
            .bind(id.to_string())
            .bind(tenant_id.to_string())
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
pub(crate) fn make_client(tenant_id: &TenantId, name: &str) -> Client {
    let now = chrono::Utc::now();
    Client {
        id: ClientId::new(),
        tenant_id: tenant_id.clone(),
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: None,
        document_number: None,
        notes: String::new(),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_pool;
    use crate::sqlite::tenant::{make_tenant, SqliteTenantRepository};
    use firerange_core::repository::tenant::TenantRepository;
    use firerange_core::repository::SortOrder;

    async fn setup() -> (SqliteClientRepository, SqliteTenantRepository, TenantId) {
        let pool = test_pool().await;
        let tenants = SqliteTenantRepository::new(pool.clone());
        let tenant = make_tenant("alvo");
        tenants.create(&tenant).await.unwrap();
        (SqliteClientRepository::new(pool), tenants, tenant.id)
    }

    #[tokio::test]
    async fn test_create_get_update() {
        let (repo, _, tenant) = setup().await;
        let mut client = make_client(&tenant, "Ana");
        repo.create(&client).await.unwrap();

        let loaded = repo.get(&tenant, &client.id).await.unwrap().unwrap();
        assert_eq!(loaded.email.as_deref(), Some("ana@example.com"));

        client.phone = Some("11 99999-0000".to_string());
        client.notes = "renovação".to_string();
        repo.update(&client).await.unwrap();
        let loaded = repo.get(&tenant, &client.id).await.unwrap().unwrap();
        assert_eq!(loaded.phone.as_deref(), Some("11 99999-0000"));
        assert_eq!(loaded.notes, "renovação");
    }

    #[tokio::test]
    async fn test_tenant_scoping() {
        let (repo, tenants, tenant) = setup().await;
        let other = make_tenant("outro");
        tenants.create(&other).await.unwrap();

        let client = make_client(&tenant, "Ana");
        repo.create(&client).await.unwrap();

        assert!(repo.get(&other.id, &client.id).await.unwrap().is_none());
        assert!(repo.list(&other.id, None).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(&other.id, &client.id).await,
            Err(RepositoryError::NotFound)
        ));

        let mut foreign = client.clone();
        foreign.tenant_id = other.id.clone();
        assert!(matches!(repo.update(&foreign).await, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_search_sort_paginate() {
        let (repo, _, tenant) = setup().await;
        for name in ["carla", "Ana", "Bruno", "Ana Paula"] {
            repo.create(&make_client(&tenant, name)).await.unwrap();
        }

        let names = |clients: Vec<Client>| clients.into_iter().map(|c| c.name).collect::<Vec<_>>();

        let all = repo.list(&tenant, None).await.unwrap();
        assert_eq!(names(all), vec!["Ana", "Ana Paula", "Bruno", "carla"]);

        let filter = ClientFilter {
            search: Some("ana".to_string()),
            ..Default::default()
        };
        assert_eq!(names(repo.list(&tenant, Some(filter)).await.unwrap()), vec!["Ana", "Ana Paula"]);

        let filter = ClientFilter {
            sort_order: Some(SortOrder::Desc),
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        };
        assert_eq!(names(repo.list(&tenant, Some(filter)).await.unwrap()), vec!["Bruno", "Ana Paula"]);
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let (repo, _, tenant) = setup().await;
        repo.create(&make_client(&tenant, "Ana")).await.unwrap();

        let filter = ClientFilter {
            search: Some("%".to_string()),
            ..Default::default()
        };
        assert!(repo.list(&tenant, Some(filter)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_tenant_cascades_to_clients() {
        let (repo, tenants, tenant) = setup().await;
        let client = make_client(&tenant, "Ana");
        repo.create(&client).await.unwrap();

        tenants.delete(&tenant).await.unwrap();
        assert!(repo.get(&tenant, &client.id).await.unwrap().is_none());
    }
}
