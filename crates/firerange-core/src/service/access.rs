//! Access key issuing and authentication.
//!
//! Keys are random tokens shown once at creation; only their hash is stored.
//! A key carries a role and, except for super admins, the tenant (and for
//! client keys the client) it is bound to.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use firerange_types::access::{AccessKey, Action, CreateAccessKeyRequest, Principal, Role};
use firerange_types::client::ClientId;
use firerange_types::error::{AccessError, KeyError, RepositoryError};
use firerange_types::tenant::TenantId;

use crate::repository::access_key::AccessKeyRepository;
use crate::repository::client::ClientRepository;
use crate::service::hash::KeyHasher;

pub struct AccessService<K: AccessKeyRepository, C: ClientRepository, H: KeyHasher> {
    key_repo: K,
    client_repo: C,
    hasher: H,
}

impl<K: AccessKeyRepository, C: ClientRepository, H: KeyHasher> AccessService<K, C, H> {
    pub fn new(key_repo: K, client_repo: C, hasher: H) -> Self {
        Self {
            key_repo,
            client_repo,
            hasher,
        }
    }

    /// Resolve a plaintext key to its principal. Unknown keys yield
    /// `Ok(None)`. Recording `last_used_at` is best-effort.
    pub async fn authenticate(&self, plaintext: &str) -> Result<Option<Principal>, RepositoryError> {
        let hash = self.hasher.hash_key(plaintext.trim());
        let Some(key) = self.key_repo.get_by_hash(&hash).await? else {
            return Ok(None);
        };

        if let Err(e) = self.key_repo.touch(&key.id).await {
            warn!(key_id = %key.id, error = %e, "failed to record key usage");
        }
        Ok(Some(key.principal()))
    }

    /// Issue a key on behalf of an authenticated caller.
    pub async fn issue(
        &self,
        issuer: &Principal,
        tenant_id: &TenantId,
        request: CreateAccessKeyRequest,
    ) -> Result<(AccessKey, String), KeyError> {
        issuer.authorize(tenant_id, Action::ManageKeys)?;
        if !issuer.role.can_grant(request.role) {
            return Err(AccessError::Forbidden(format!("grant {}", request.role)).into());
        }
        let tenant = (request.role != Role::SuperAdmin).then(|| tenant_id.clone());
        self.create_key(&request.name, request.role, tenant, request.client_id)
            .await
    }

    /// Create a key without an issuer check. Used by the local CLI, which
    /// runs with full access to the data directory.
    pub async fn create_key(
        &self,
        name: &str,
        role: Role,
        tenant_id: Option<TenantId>,
        client_id: Option<ClientId>,
    ) -> Result<(AccessKey, String), KeyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(KeyError::Invalid("name cannot be empty".to_string()));
        }

        match (role, &tenant_id, &client_id) {
            (Role::SuperAdmin, None, None) => {}
            (Role::SuperAdmin, _, _) => {
                return Err(KeyError::Invalid(
                    "super admin keys are not bound to a tenant or client".to_string(),
                ));
            }
            (_, None, _) => {
                return Err(KeyError::Invalid(format!("{role} keys need a tenant")));
            }
            (Role::Client, Some(tenant), Some(client)) => {
                let exists = self
                    .client_repo
                    .get(tenant, client)
                    .await
                    .map_err(|e| KeyError::StorageError(e.to_string()))?
                    .is_some();
                if !exists {
                    return Err(KeyError::Invalid(format!("client {client} not found")));
                }
            }
            (Role::Client, Some(_), None) => {
                return Err(KeyError::Invalid("client keys need a client_id".to_string()));
            }
            (_, Some(_), Some(_)) => {
                return Err(KeyError::Invalid(format!(
                    "{role} keys cannot be bound to a client"
                )));
            }
            (_, Some(_), None) => {}
        }

        let plaintext = self.hasher.generate_key();
        let key = AccessKey {
            id: Uuid::now_v7(),
            name: name.to_string(),
            key_hash: self.hasher.hash_key(&plaintext),
            role,
            tenant_id,
            client_id,
            created_at: Utc::now(),
            last_used_at: None,
        };
        let key = self
            .key_repo
            .create(&key)
            .await
            .map_err(|e| KeyError::StorageError(e.to_string()))?;

        info!(key_id = %key.id, role = %key.role, "access key created");
        Ok((key, plaintext))
    }
}
