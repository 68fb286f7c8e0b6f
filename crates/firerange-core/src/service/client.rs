//! Client management service.
//!
//! Creating a client also stores its workflow, instantiated from the active
//! template, so every client owns exactly one workflow from intake onwards.

use chrono::Utc;
use tracing::{info, warn};

use firerange_types::client::{Client, ClientId, CreateClientRequest, UpdateClientRequest};
use firerange_types::error::{ClientError, RepositoryError};
use firerange_types::tenant::TenantId;
use firerange_types::workflow::{Workflow, WorkflowTemplate};

use crate::repository::client::{ClientFilter, ClientRepository};
use crate::repository::workflow::WorkflowRepository;
use crate::storage::document_store::DocumentStore;

/// Maximum length of a client name, in characters.
pub const MAX_CLIENT_NAME_LEN: usize = 200;

/// An address with exactly one `@`, text on both sides and no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

fn validate_name(name: &str) -> Result<String, ClientError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::Invalid("name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_CLIENT_NAME_LEN {
        return Err(ClientError::Invalid(format!(
            "name cannot be longer than {MAX_CLIENT_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn normalize_email(email: Option<String>) -> Result<Option<String>, ClientError> {
    match optional(email) {
        Some(email) if !is_valid_email(&email) => {
            Err(ClientError::Invalid(format!("invalid email address '{email}'")))
        }
        other => Ok(other),
    }
}

/// Trim an optional field; blank becomes `None`.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct ClientService<C: ClientRepository, W: WorkflowRepository, S: DocumentStore> {
    client_repo: C,
    workflow_repo: W,
    document_store: S,
    workflow_template: WorkflowTemplate,
}

impl<C: ClientRepository, W: WorkflowRepository, S: DocumentStore> ClientService<C, W, S> {
    pub fn new(
        client_repo: C,
        workflow_repo: W,
        document_store: S,
        workflow_template: WorkflowTemplate,
    ) -> Self {
        Self {
            client_repo,
            workflow_repo,
            document_store,
            workflow_template,
        }
    }

    /// Register a client and store its initial workflow.
    pub async fn create_client(
        &self,
        tenant_id: &TenantId,
        request: CreateClientRequest,
    ) -> Result<Client, ClientError> {
        let now = Utc::now();
        let client = Client {
            id: ClientId::new(),
            tenant_id: tenant_id.clone(),
            name: validate_name(&request.name)?,
            email: normalize_email(request.email)?,
            phone: optional(request.phone),
            document_number: optional(request.document_number),
            notes: request.notes.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let client = self
            .client_repo
            .create(&client)
            .await
            .map_err(|e| ClientError::StorageError(e.to_string()))?;

        let workflow = Workflow {
            tenant_id: tenant_id.clone(),
            client_id: client.id.clone(),
            steps: self.workflow_template.instantiate(),
            revision: 0,
            updated_at: now,
        };
        self.workflow_repo
            .save_workflow(&workflow)
            .await
            .map_err(|e| ClientError::StorageError(e.to_string()))?;

        info!(tenant_id = %tenant_id, client_id = %client.id, "client created");
        Ok(client)
    }

    pub async fn get_client(
        &self,
        tenant_id: &TenantId,
        id: &ClientId,
    ) -> Result<Client, ClientError> {
        self.client_repo
            .get(tenant_id, id)
            .await
            .map_err(|e| ClientError::StorageError(e.to_string()))?
            .ok_or(ClientError::NotFound)
    }

    pub async fn list_clients(
        &self,
        tenant_id: &TenantId,
        filter: Option<ClientFilter>,
    ) -> Result<Vec<Client>, ClientError> {
        self.client_repo
            .list(tenant_id, filter)
            .await
            .map_err(|e| ClientError::StorageError(e.to_string()))
    }

    /// Apply a partial update. Blank contact fields are cleared.
    pub async fn update_client(
        &self,
        tenant_id: &TenantId,
        id: &ClientId,
        request: UpdateClientRequest,
    ) -> Result<Client, ClientError> {
        let mut client = self.get_client(tenant_id, id).await?;

        if let Some(name) = request.name {
            client.name = validate_name(&name)?;
        }
        if request.email.is_some() {
            client.email = normalize_email(request.email)?;
        }
        if request.phone.is_some() {
            client.phone = optional(request.phone);
        }
        if request.document_number.is_some() {
            client.document_number = optional(request.document_number);
        }
        if let Some(notes) = request.notes {
            client.notes = notes;
        }
        client.updated_at = Utc::now();

        let client = self
            .client_repo
            .update(&client)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ClientError::NotFound,
                other => ClientError::StorageError(other.to_string()),
            })?;
        info!(tenant_id = %tenant_id, client_id = %id, "client updated");
        Ok(client)
    }

    /// Delete a client. Rows cascade in storage; document bytes are removed
    /// best-effort afterwards.
    pub async fn delete_client(&self, tenant_id: &TenantId, id: &ClientId) -> Result<(), ClientError> {
        self.client_repo
            .delete(tenant_id, id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ClientError::NotFound,
                other => ClientError::StorageError(other.to_string()),
            })?;

        if let Err(e) = self.document_store.delete_client(tenant_id, id).await {
            warn!(tenant_id = %tenant_id, client_id = %id, error = %e, "failed to remove client documents");
        }

        info!(tenant_id = %tenant_id, client_id = %id, "client deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryClients, MemoryStore, MemoryWorkflows};
    use crate::workflow::builtin_template;
    use uuid::Uuid;

    fn service() -> (
        ClientService<MemoryClients, MemoryWorkflows, MemoryStore>,
        MemoryWorkflows,
        MemoryStore,
    ) {
        let workflows = MemoryWorkflows::default();
        let store = MemoryStore::default();
        let svc = ClientService::new(
            MemoryClients::default(),
            workflows.clone(),
            store.clone(),
            builtin_template(),
        );
        (svc, workflows, store)
    }

    fn request(name: &str, email: Option<&str>) -> CreateClientRequest {
        CreateClientRequest {
            name: name.to_string(),
            email: email.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ana@clube.com.br"));
        assert!(is_valid_email("a@b"));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("@clube.com"));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("ana@@clube.com"));
        assert!(!is_valid_email("a@b@c"));
        assert!(!is_valid_email("ana maria@clube.com"));
    }

    #[tokio::test]
    async fn test_create_client_stores_workflow() {
        let (svc, workflows, _) = service();
        let tenant = TenantId::new();
        let client = svc
            .create_client(&tenant, request("  Ana Souza ", Some(" ana@example.com ")))
            .await
            .unwrap();
        assert_eq!(client.name, "Ana Souza");
        assert_eq!(client.email.as_deref(), Some("ana@example.com"));

        let workflow = workflows.stored(&client.id).unwrap();
        assert_eq!(workflow.revision, 1);
        assert_eq!(workflow.steps, builtin_template().instantiate());
    }

    #[tokio::test]
    async fn test_create_client_validation() {
        let (svc, _, _) = service();
        let tenant = TenantId::new();
        assert!(matches!(
            svc.create_client(&tenant, request("", None)).await,
            Err(ClientError::Invalid(_))
        ));
        assert!(matches!(
            svc.create_client(&tenant, request(&"x".repeat(201), None)).await,
            Err(ClientError::Invalid(_))
        ));
        assert!(matches!(
            svc.create_client(&tenant, request("Ana", Some("invalido"))).await,
            Err(ClientError::Invalid(_))
        ));
        // Blank email is treated as absent.
        let client = svc.create_client(&tenant, request("Ana", Some("  "))).await.unwrap();
        assert!(client.email.is_none());
    }

    #[tokio::test]
    async fn test_update_client_partial_and_clear() {
        let (svc, _, _) = service();
        let tenant = TenantId::new();
        let client = svc
            .create_client(
                &tenant,
                CreateClientRequest {
                    name: "Bruno".to_string(),
                    email: Some("bruno@example.com".to_string()),
                    phone: Some("11 99999-0000".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = svc
            .update_client(
                &tenant,
                &client.id,
                UpdateClientRequest {
                    phone: Some(String::new()),
                    notes: Some("prefere contato por email".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Bruno");
        assert_eq!(updated.email.as_deref(), Some("bruno@example.com"));
        assert!(updated.phone.is_none());
        assert_eq!(updated.notes, "prefere contato por email");
    }

    #[tokio::test]
    async fn test_clients_are_tenant_scoped() {
        let (svc, _, _) = service();
        let tenant = TenantId::new();
        let client = svc.create_client(&tenant, request("Carla", None)).await.unwrap();

        assert!(matches!(
            svc.get_client(&TenantId::new(), &client.id).await,
            Err(ClientError::NotFound)
        ));
        assert!(svc.list_clients(&TenantId::new(), None).await.unwrap().is_empty());
        assert_eq!(svc.list_clients(&tenant, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_client_removes_documents() {
        let (svc, _, store) = service();
        let tenant = TenantId::new();
        let client = svc.create_client(&tenant, request("Davi", None)).await.unwrap();
        store
            .put(&tenant, &client.id, &Uuid::now_v7(), b"pdf")
            .await
            .unwrap();

        svc.delete_client(&tenant, &client.id).await.unwrap();
        assert!(store.objects.lock().unwrap().is_empty());
        assert!(matches!(
            svc.delete_client(&tenant, &client.id).await,
            Err(ClientError::NotFound)
        ));
    }
}
