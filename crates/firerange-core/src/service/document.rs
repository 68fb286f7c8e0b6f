//! Client document service.
//!
//! Bytes go to the `DocumentStore`, metadata to the `DocumentRepository`.
//! The bytes are written first so a metadata row never points at nothing.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use firerange_types::client::ClientId;
use firerange_types::document::ClientDocument;
use firerange_types::error::{DocumentError, RepositoryError};
use firerange_types::tenant::TenantId;

use crate::repository::client::ClientRepository;
use crate::repository::document::DocumentRepository;
use crate::storage::document_store::DocumentStore;
use crate::storage::{detect_mime, validate_filename};

pub struct DocumentService<C: ClientRepository, D: DocumentRepository, S: DocumentStore> {
    client_repo: C,
    document_repo: D,
    store: S,
    max_bytes: u64,
}

impl<C: ClientRepository, D: DocumentRepository, S: DocumentStore> DocumentService<C, D, S> {
    /// - `max_bytes`: upload size limit per document
    pub fn new(client_repo: C, document_repo: D, store: S, max_bytes: u64) -> Self {
        Self {
            client_repo,
            document_repo,
            store,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    async fn ensure_client(&self, tenant_id: &TenantId, client_id: &ClientId) -> Result<(), DocumentError> {
        self.client_repo
            .get(tenant_id, client_id)
            .await
            .map_err(|e| DocumentError::StorageError(e.to_string()))?
            .map(|_| ())
            .ok_or(DocumentError::ClientNotFound)
    }

    pub async fn upload(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        filename: &str,
        step_id: Option<String>,
        data: &[u8],
    ) -> Result<ClientDocument, DocumentError> {
        self.ensure_client(tenant_id, client_id).await?;

        let filename = filename.trim();
        validate_filename(filename).map_err(DocumentError::InvalidFilename)?;

        let size = data.len() as u64;
        if size > self.max_bytes {
            return Err(DocumentError::TooLarge {
                max: self.max_bytes,
                actual: size,
            });
        }

        let document = ClientDocument {
            id: Uuid::now_v7(),
            tenant_id: tenant_id.clone(),
            client_id: client_id.clone(),
            step_id: step_id.filter(|s| !s.trim().is_empty()),
            filename: filename.to_string(),
            mime_type: detect_mime(filename),
            size_bytes: size,
            uploaded_at: Utc::now(),
        };

        self.store
            .put(tenant_id, client_id, &document.id, data)
            .await
            .map_err(|e| DocumentError::StorageError(e.to_string()))?;

        let document = match self.document_repo.create(&document).await {
            Ok(doc) => doc,
            Err(e) => {
                if let Err(cleanup) = self.store.delete(tenant_id, client_id, &document.id).await {
                    warn!(document_id = %document.id, error = %cleanup, "failed to remove orphaned document bytes");
                }
                return Err(DocumentError::StorageError(e.to_string()));
            }
        };

        info!(
            tenant_id = %tenant_id,
            client_id = %client_id,
            document_id = %document.id,
            size_bytes = size,
            "document uploaded"
        );
        Ok(document)
    }

    pub async fn list(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Vec<ClientDocument>, DocumentError> {
        self.ensure_client(tenant_id, client_id).await?;
        self.document_repo
            .list(tenant_id, client_id)
            .await
            .map_err(|e| DocumentError::StorageError(e.to_string()))
    }

    pub async fn get(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        id: &Uuid,
    ) -> Result<ClientDocument, DocumentError> {
        self.document_repo
            .get(tenant_id, client_id, id)
            .await
            .map_err(|e| DocumentError::StorageError(e.to_string()))?
            .ok_or(DocumentError::NotFound)
    }

    /// Metadata and bytes of one document.
    pub async fn download(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        id: &Uuid,
    ) -> Result<(ClientDocument, Vec<u8>), DocumentError> {
        let document = self.get(tenant_id, client_id, id).await?;
        let data = self
            .store
            .get(tenant_id, client_id, id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => DocumentError::NotFound,
                other => DocumentError::StorageError(other.to_string()),
            })?;
        Ok((document, data))
    }

    pub async fn delete(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        id: &Uuid,
    ) -> Result<(), DocumentError> {
        self.document_repo
            .delete(tenant_id, client_id, id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => DocumentError::NotFound,
                other => DocumentError::StorageError(other.to_string()),
            })?;
        self.store
            .delete(tenant_id, client_id, id)
            .await
            .map_err(|e| DocumentError::StorageError(e.to_string()))?;
        info!(tenant_id = %tenant_id, client_id = %client_id, document_id = %id, "document deleted");
        Ok(())
    }
}
