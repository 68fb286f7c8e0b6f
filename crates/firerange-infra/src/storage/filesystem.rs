//! Local filesystem document store implementation.
//!
//! Implements the `DocumentStore` trait from `firerange-core`. Bytes live at
//! `{base_dir}/documents/{tenant_id}/{client_id}/{document_id}`; metadata
//! (filename, mime type, size) is tracked in SQLite by
//! `SqliteDocumentRepository`. Ids are UUIDs, so no user input ever reaches
//! a path.

use std::path::PathBuf;

use firerange_core::storage::document_store::DocumentStore;
use firerange_types::client::ClientId;
use firerange_types::error::RepositoryError;
use firerange_types::tenant::TenantId;
use uuid::Uuid;

/// Local filesystem-backed document store.
///
/// Directory layout:
/// ```text
/// {base_dir}/documents/
///   {tenant_id}/
///     {client_id}/
///       {document_id}
/// ```
pub struct LocalDocumentStore {
    base_dir: PathBuf,
}

impl LocalDocumentStore {
    /// Create a store rooted at `base_dir` (normally the data directory).
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn client_dir(&self, tenant_id: &TenantId, client_id: &ClientId) -> PathBuf {
        self.base_dir
            .join("documents")
            .join(tenant_id.to_string())
            .join(client_id.to_string())
    }

    fn document_path(&self, tenant_id: &TenantId, client_id: &ClientId, document_id: &Uuid) -> PathBuf {
        self.client_dir(tenant_id, client_id).join(document_id.to_string())
    }
}

impl DocumentStore for LocalDocumentStore {
    async fn put(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        document_id: &Uuid,
        data: &[u8],
    ) -> Result<(), RepositoryError> {
        let dir = self.client_dir(tenant_id, client_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to create document dir: {e}")))?;

        tokio::fs::write(dir.join(document_id.to_string()), data)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to write document: {e}")))
    }

    async fn get(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        document_id: &Uuid,
    ) -> Result<Vec<u8>, RepositoryError> {
        match tokio::fs::read(self.document_path(tenant_id, client_id, document_id)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RepositoryError::NotFound),
            Err(e) => Err(RepositoryError::Query(format!("Failed to read document: {e}"))),
        }
    }

    async fn delete(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        document_id: &Uuid,
    ) -> Result<(), RepositoryError> {
        match tokio::fs::remove_file(self.document_path(tenant_id, client_id, document_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepositoryError::Query(format!("Failed to delete document: {e}"))),
        }
    }

    async fn delete_client(&self, tenant_id: &TenantId, client_id: &ClientId) -> Result<(), RepositoryError> {
        match tokio::fs::remove_dir_all(self.client_dir(tenant_id, client_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepositoryError::Query(format!(
                "Failed to delete client documents: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path().to_path_buf());
        let (tenant, client, doc) = (TenantId::new(), ClientId::new(), Uuid::now_v7());

        store.put(&tenant, &client, &doc, b"%PDF-1.7").await.unwrap();
        let expected_path = dir
            .path()
            .join("documents")
            .join(tenant.to_string())
            .join(client.to_string())
            .join(doc.to_string());
        assert!(expected_path.exists());
        assert_eq!(store.get(&tenant, &client, &doc).await.unwrap(), b"%PDF-1.7");

        store.delete(&tenant, &client, &doc).await.unwrap();
        assert!(matches!(
            store.get(&tenant, &client, &doc).await,
            Err(RepositoryError::NotFound)
        ));
        // Deleting twice is fine.
        store.delete(&tenant, &client, &doc).await.unwrap();
    }

    #[tokio::test]
    async fn test_documents_are_isolated_per_client() {
        let dir = tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path().to_path_buf());
        let tenant = TenantId::new();
        let (ana, bruno, doc) = (ClientId::new(), ClientId::new(), Uuid::now_v7());

        store.put(&tenant, &ana, &doc, b"ana").await.unwrap();
        assert!(matches!(
            store.get(&tenant, &bruno, &doc).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            store.get(&TenantId::new(), &ana, &doc).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_client_removes_everything() {
        let dir = tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path().to_path_buf());
        let (tenant, client) = (TenantId::new(), ClientId::new());
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());

        store.put(&tenant, &client, &a, b"a").await.unwrap();
        store.put(&tenant, &client, &b, b"b").await.unwrap();
        store.delete_client(&tenant, &client).await.unwrap();

        assert!(matches!(store.get(&tenant, &client, &a).await, Err(RepositoryError::NotFound)));
        assert!(matches!(store.get(&tenant, &client, &b).await, Err(RepositoryError::NotFound)));
        store.delete_client(&tenant, &client).await.unwrap();
    }
}
