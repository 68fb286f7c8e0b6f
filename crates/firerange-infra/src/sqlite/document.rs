//! SQLite client document metadata repository implementation.

use firerange_core::repository::document::DocumentRepository;
use firerange_types::client::ClientId;
use firerange_types::document::ClientDocument;
use firerange_types::error::RepositoryError;
use firerange_types::tenant::TenantId;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `DocumentRepository`.
pub struct SqliteDocumentRepository {
    pool: DatabasePool,
}

impl SqliteDocumentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct DocumentRow {
    id: String,
    tenant_id: String,
    client_id: String,
    step_id: Option<String>,
    filename: String,
    mime_type: String,
    size_bytes: i64,
    uploaded_at: String,
}

impl DocumentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            tenant_id: row.try_get("tenant_id")?,
            client_id: row.try_get("client_id")?,
            step_id: row.try_get("step_id")?,
            filename: row.try_get("filename")?,
            mime_type: row.try_get("mime_type")?,
            size_bytes: row.try_get("size_bytes")?,
            uploaded_at: row.try_get("uploaded_at")?,
        })
    }

    fn into_document(self) -> Result<ClientDocument, RepositoryError> {
        Ok(ClientDocument {
            id: parse_uuid(&self.id)?,
            tenant_id: self
                .tenant_id
                .parse()
                .map_err(|e| RepositoryError::Query(format!("invalid tenant id: {e}")))?,
            client_id: self
                .client_id
                .parse()
                .map_err(|e| RepositoryError::Query(format!("invalid client id: {e}")))?,
            step_id: self.step_id,
            filename: self.filename,
            mime_type: self.mime_type,
            size_bytes: u64::try_from(self.size_bytes)
                .map_err(|e| RepositoryError::Query(format!("invalid size: {e}")))?,
            uploaded_at: parse_datetime(&self.uploaded_at)?,
        })
    }
}

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<ClientDocument, RepositoryError> {
    DocumentRow::from_row(row)
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .into_document()
}

impl DocumentRepository for SqliteDocumentRepository {
    async fn create(&self, document: &ClientDocument) -> Result<ClientDocument, RepositoryError> {
        sqlx::query(
            "INSERT INTO client_documents (id, tenant_id, client_id, step_id, filename, mime_type, size_bytes, uploaded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(document.id.to_string())
        .bind(document.tenant_id.to_string())
        .bind(document.client_id.to_string())
        .bind(&document.step_id)
        .bind(&document.filename)
        .bind(&document.mime_type)
        .bind(document.size_bytes as i64)
        .bind(format_datetime(&document.uploaded_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(document.clone())
    }

    async fn get(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        id: &Uuid,
    ) -> Result<Option<ClientDocument>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM client_documents WHERE id = ? AND tenant_id = ? AND client_id = ?")
            .bind(id.to_string())
            .bind(tenant_id.to_string())
            .bind(client_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(map_row).transpose()
    }

    async fn list(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Vec<ClientDocument>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM client_documents WHERE tenant_id = ? AND client_id = ?
             ORDER BY uploaded_at DESC, id DESC",
        )
        .bind(tenant_id.to_string())
        .bind(client_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(map_row).collect()
    }

    async fn delete(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        id: &Uuid,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM client_documents WHERE id = ? AND tenant_id = ? AND client_id = ?")
            .bind(id.to_string())
            .bind(tenant_id.to_string())
            .bind(client_id.to_string())
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
    use crate::sqlite::client::{make_client, SqliteClientRepository};
    use crate::sqlite::pool::test_pool;
    use crate::sqlite::tenant::{make_tenant, SqliteTenantRepository};
    use chrono::{Duration, Utc};
    use firerange_core::repository::client::ClientRepository;
    use firerange_core::repository::tenant::TenantRepository;

    fn make_document(tenant_id: &TenantId, client_id: &ClientId, filename: &str) -> ClientDocument {
        ClientDocument {
            id: Uuid::now_v7(),
            tenant_id: tenant_id.clone(),
            client_id: client_id.clone(),
            step_id: Some("documentacao".to_string()),
            filename: filename.to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 2048,
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_document_metadata_lifecycle() {
        let pool = test_pool().await;
        let tenant = make_tenant("alvo");
        SqliteTenantRepository::new(pool.clone()).create(&tenant).await.unwrap();
        let clients = SqliteClientRepository::new(pool.clone());
        let client = make_client(&tenant.id, "Ana");
        clients.create(&client).await.unwrap();
        let repo = SqliteDocumentRepository::new(pool);

        let first = make_document(&tenant.id, &client.id, "rg.pdf");
        let mut second = make_document(&tenant.id, &client.id, "cpf.pdf");
        second.uploaded_at = first.uploaded_at + Duration::seconds(5);
        second.step_id = None;
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();

        let loaded = repo.get(&tenant.id, &client.id, &first.id).await.unwrap().unwrap();
        assert_eq!(loaded.size_bytes, 2048);
        assert_eq!(loaded.step_id.as_deref(), Some("documentacao"));
        assert!(repo.get(&tenant.id, &ClientId::new(), &first.id).await.unwrap().is_none());

        let names: Vec<String> = repo
            .list(&tenant.id, &client.id)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.filename)
            .collect();
        assert_eq!(names, vec!["cpf.pdf", "rg.pdf"]);

        repo.delete(&tenant.id, &client.id, &first.id).await.unwrap();
        assert!(matches!(
            repo.delete(&tenant.id, &client.id, &first.id).await,
            Err(RepositoryError::NotFound)
        ));

        clients.delete(&tenant.id, &client.id).await.unwrap();
        assert!(repo.list(&tenant.id, &client.id).await.unwrap().is_empty());
    }
}
