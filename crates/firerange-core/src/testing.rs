//! In-memory implementations of the core ports for service tests.
//!
//! Every fake is `Clone` and shares its state through an `Arc`, so a test
//! can keep a handle and inspect what a service wrote.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use firerange_types::access::AccessKey;
use firerange_types::client::{Client, ClientId};
use firerange_types::document::ClientDocument;
use firerange_types::email::{EmailSendLog, EmailTemplate, OutgoingEmail};
use firerange_types::error::{MailError, RepositoryError};
use firerange_types::tenant::{Tenant, TenantId};
use firerange_types::workflow::{ClientProgress, Progress, Workflow};

use crate::mail::Mailer;
use crate::repository::access_key::AccessKeyRepository;
use crate::repository::client::{ClientFilter, ClientRepository};
use crate::repository::document::DocumentRepository;
use crate::repository::email::EmailRepository;
use crate::repository::tenant::TenantRepository;
use crate::repository::workflow::WorkflowRepository;
use crate::service::hash::{KEY_PREFIX, KeyHasher};
use crate::storage::document_store::DocumentStore;

#[derive(Clone, Default)]
pub struct MemoryTenants {
    pub tenants: Arc<Mutex<Vec<Tenant>>>,
}

impl TenantRepository for MemoryTenants {
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, RepositoryError> {
        let mut tenants = self.tenants.lock().unwrap();
        if tenants.iter().any(|t| t.slug == tenant.slug) {
            return Err(RepositoryError::Conflict(format!(
                "slug '{}' already exists",
                tenant.slug
            )));
        }
        tenants.push(tenant.clone());
        Ok(tenant.clone())
    }

    async fn get_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, RepositoryError> {
        Ok(self.tenants.lock().unwrap().iter().find(|t| &t.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>, RepositoryError> {
        Ok(self.tenants.lock().unwrap().iter().find(|t| t.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Tenant>, RepositoryError> {
        let mut tenants = self.tenants.lock().unwrap().clone();
        tenants.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(tenants)
    }

    async fn delete(&self, id: &TenantId) -> Result<(), RepositoryError> {
        let mut tenants = self.tenants.lock().unwrap();
        let before = tenants.len();
        tenants.retain(|t| &t.id != id);
        if tenants.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryClients {
    pub clients: Arc<Mutex<Vec<Client>>>,
}

impl ClientRepository for MemoryClients {
    async fn create(&self, client: &Client) -> Result<Client, RepositoryError> {
        self.clients.lock().unwrap().push(client.clone());
        Ok(client.clone())
    }

    async fn get(
        &self,
        tenant_id: &TenantId,
        id: &ClientId,
    ) -> Result<Option<Client>, RepositoryError> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.tenant_id == tenant_id && &c.id == id)
            .cloned())
    }

    async fn list(
        &self,
        tenant_id: &TenantId,
        filter: Option<ClientFilter>,
    ) -> Result<Vec<Client>, RepositoryError> {
        let filter = filter.unwrap_or_default();
        let search = filter.search.map(|s| s.to_lowercase());
        let mut clients: Vec<Client> = self
            .clients
            .lock()
            .unwrap()
            .iter()
            .filter(|c| &c.tenant_id == tenant_id)
            .filter(|c| {
                search
                    .as_ref()
                    .is_none_or(|s| c.name.to_lowercase().contains(s))
            })
            .cloned()
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn update(&self, client: &Client) -> Result<Client, RepositoryError> {
        let mut clients = self.clients.lock().unwrap();
        let slot = clients
            .iter_mut()
            .find(|c| c.tenant_id == client.tenant_id && c.id == client.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = client.clone();
        Ok(client.clone())
    }

    async fn delete(&self, tenant_id: &TenantId, id: &ClientId) -> Result<(), RepositoryError> {
        let mut clients = self.clients.lock().unwrap();
        let before = clients.len();
        clients.retain(|c| !(&c.tenant_id == tenant_id && &c.id == id));
        if clients.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Workflow store with revision checks. `conflicts` makes the next N saves
/// fail as if another writer had won the race.
#[derive(Clone, Default)]
pub struct MemoryWorkflows {
    pub workflows: Arc<Mutex<HashMap<ClientId, Workflow>>>,
    pub conflicts: Arc<AtomicUsize>,
    pub saves: Arc<AtomicUsize>,
}

impl MemoryWorkflows {
    pub fn stored(&self, client_id: &ClientId) -> Option<Workflow> {
        self.workflows.lock().unwrap().get(client_id).cloned()
    }

    pub fn fail_next_saves(&self, n: usize) {
        self.conflicts.store(n, Ordering::SeqCst);
    }
}

impl WorkflowRepository for MemoryWorkflows {
    async fn load_workflow(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Option<Workflow>, RepositoryError> {
        Ok(self
            .workflows
            .lock()
            .unwrap()
            .get(client_id)
            .filter(|w| &w.tenant_id == tenant_id)
            .cloned())
    }

    async fn save_workflow(&self, workflow: &Workflow) -> Result<Workflow, RepositoryError> {
        if self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(RepositoryError::Conflict("stale revision".to_string()));
        }

        let mut workflows = self.workflows.lock().unwrap();
        let current = workflows.get(&workflow.client_id).map(|w| w.revision).unwrap_or(0);
        if current != workflow.revision {
            return Err(RepositoryError::Conflict("stale revision".to_string()));
        }

        let mut saved = workflow.clone();
        saved.revision += 1;
        saved.updated_at = Utc::now();
        workflows.insert(saved.client_id.clone(), saved.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(saved)
    }

    async fn progress_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<ClientProgress>, RepositoryError> {
        Ok(self
            .workflows
            .lock()
            .unwrap()
            .values()
            .filter(|w| &w.tenant_id == tenant_id)
            .map(|w| ClientProgress {
                client_id: w.client_id.clone(),
                client_name: String::new(),
                progress: Progress::new(
                    w.steps.iter().filter(|s| s.completed).count(),
                    w.steps.len(),
                ),
            })
            .collect())
    }
}

/// Email repository. `fail_upserts_after(n)` lets `n` more template writes
/// succeed, then fails the rest.
#[derive(Clone, Default)]
pub struct MemoryEmail {
    pub templates: Arc<Mutex<Vec<EmailTemplate>>>,
    pub logs: Arc<Mutex<Vec<EmailSendLog>>>,
    pub upserts_left: Arc<Mutex<Option<usize>>>,
}

impl MemoryEmail {
    pub fn fail_upserts_after(&self, n: usize) {
        *self.upserts_left.lock().unwrap() = Some(n);
    }
}

impl EmailRepository for MemoryEmail {
    async fn list_templates(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<EmailTemplate>, RepositoryError> {
        let mut templates: Vec<EmailTemplate> = self
            .templates
            .lock()
            .unwrap()
            .iter()
            .filter(|t| &t.tenant_id == tenant_id)
            .cloned()
            .collect();
        templates.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(templates)
    }

    async fn get_template(
        &self,
        tenant_id: &TenantId,
        key: &str,
    ) -> Result<Option<EmailTemplate>, RepositoryError> {
        Ok(self
            .templates
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.tenant_id == tenant_id && t.key == key)
            .cloned())
    }

    async fn upsert_template(
        &self,
        template: &EmailTemplate,
    ) -> Result<EmailTemplate, RepositoryError> {
        if let Some(left) = self.upserts_left.lock().unwrap().as_mut() {
            if *left == 0 {
                return Err(RepositoryError::Query("disk I/O error".to_string()));
            }
            *left -= 1;
        }
        let mut templates = self.templates.lock().unwrap();
        match templates
            .iter_mut()
            .find(|t| t.tenant_id == template.tenant_id && t.key == template.key)
        {
            Some(existing) => {
                let kept = EmailTemplate {
                    id: existing.id,
                    created_at: existing.created_at,
                    ..template.clone()
                };
                *existing = kept.clone();
                Ok(kept)
            }
            None => {
                templates.push(template.clone());
                Ok(template.clone())
            }
        }
    }

    async fn delete_template(&self, tenant_id: &TenantId, key: &str) -> Result<(), RepositoryError> {
        let mut templates = self.templates.lock().unwrap();
        let before = templates.len();
        templates.retain(|t| !(&t.tenant_id == tenant_id && t.key == key));
        if templates.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn append_log(&self, entry: &EmailSendLog) -> Result<(), RepositoryError> {
        self.logs.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_logs(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Vec<EmailSendLog>, RepositoryError> {
        let mut logs: Vec<EmailSendLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| &l.tenant_id == tenant_id && &l.client_id == client_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(logs)
    }
}

/// Mailer that records every message, or refuses all of them.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryDocuments {
    pub documents: Arc<Mutex<Vec<ClientDocument>>>,
}

impl DocumentRepository for MemoryDocuments {
    async fn create(&self, document: &ClientDocument) -> Result<ClientDocument, RepositoryError> {
        self.documents.lock().unwrap().push(document.clone());
        Ok(document.clone())
    }

    async fn get(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        id: &Uuid,
    ) -> Result<Option<ClientDocument>, RepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| &d.tenant_id == tenant_id && &d.client_id == client_id && &d.id == id)
            .cloned())
    }

    async fn list(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Vec<ClientDocument>, RepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| &d.tenant_id == tenant_id && &d.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn delete(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        id: &Uuid,
    ) -> Result<(), RepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents
            .retain(|d| !(&d.tenant_id == tenant_id && &d.client_id == client_id && &d.id == id));
        if documents.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    pub objects: Arc<Mutex<HashMap<(ClientId, Uuid), Vec<u8>>>>,
}

impl DocumentStore for MemoryStore {
    async fn put(
        &self,
        _tenant_id: &TenantId,
        client_id: &ClientId,
        document_id: &Uuid,
        data: &[u8],
    ) -> Result<(), RepositoryError> {
        self.objects
            .lock()
            .unwrap()
            .insert((client_id.clone(), *document_id), data.to_vec());
        Ok(())
    }

    async fn get(
        &self,
        _tenant_id: &TenantId,
        client_id: &ClientId,
        document_id: &Uuid,
    ) -> Result<Vec<u8>, RepositoryError> {
        self.objects
            .lock()
            .unwrap()
            .get(&(client_id.clone(), *document_id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(
        &self,
        _tenant_id: &TenantId,
        client_id: &ClientId,
        document_id: &Uuid,
    ) -> Result<(), RepositoryError> {
        self.objects
            .lock()
            .unwrap()
            .remove(&(client_id.clone(), *document_id));
        Ok(())
    }

    async fn delete_client(
        &self,
        _tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<(), RepositoryError> {
        self.objects.lock().unwrap().retain(|(c, _), _| c != client_id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryKeys {
    pub keys: Arc<Mutex<Vec<AccessKey>>>,
}

impl AccessKeyRepository for MemoryKeys {
    async fn create(&self, key: &AccessKey) -> Result<AccessKey, RepositoryError> {
        self.keys.lock().unwrap().push(key.clone());
        Ok(key.clone())
    }

    async fn get_by_hash(&self, key_hash: &str) -> Result<Option<AccessKey>, RepositoryError> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.key_hash == key_hash)
            .cloned())
    }

    async fn touch(&self, id: &Uuid) -> Result<(), RepositoryError> {
        if let Some(key) = self.keys.lock().unwrap().iter_mut().find(|k| &k.id == id) {
            key.last_used_at = Some(Utc::now());
        }
        Ok(())
    }
}

/// Deterministic hasher: keys count up, the "hash" is the reversed key.
#[derive(Default)]
pub struct CountingHasher {
    counter: AtomicUsize,
}

impl KeyHasher for CountingHasher {
    fn generate_key(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{KEY_PREFIX}{n:08}")
    }

    fn hash_key(&self, key: &str) -> String {
        key.chars().rev().collect()
    }
}
