//! Roles, principals and the permission matrix used to gate every route.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::client::ClientId;
use crate::error::AccessError;
use crate::tenant::TenantId;

/// Role carried by an access key.
///
/// - SuperAdmin: every tenant, including tenant management
/// - Admin: everything inside its own tenant
/// - Operator: day-to-day case handling inside its own tenant
/// - Client: read access to its own case, plus its own checklist and documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Operator,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::SuperAdmin => write!(f, "super_admin"),
            Role::Admin => write!(f, "admin"),
            Role::Operator => write!(f, "operator"),
            Role::Client => write!(f, "client"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "operator" => Ok(Role::Operator),
            "client" => Ok(Role::Client),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// Operations subject to role gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ManageTenants,
    ViewClients,
    CreateClients,
    EditClients,
    DeleteClients,
    ViewWorkflow,
    ToggleStep,
    ToggleSubTask,
    ScheduleStep,
    ResetWorkflow,
    ViewTemplates,
    ManageTemplates,
    SendEmails,
    ViewEmailHistory,
    ViewDocuments,
    UploadDocuments,
    DeleteDocuments,
    ViewStats,
    ManageKeys,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the serde name so logs and error bodies match the API.
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{self:?}"));
        write!(f, "{name}")
    }
}

impl Role {
    /// The permission matrix.
    pub fn allows(self, action: Action) -> bool {
        use Action::*;
        match self {
            Role::SuperAdmin => true,
            Role::Admin => !matches!(action, ManageTenants),
            Role::Operator => !matches!(
                action,
                ManageTenants | DeleteClients | ResetWorkflow | ManageTemplates | ManageKeys
                    | DeleteDocuments
            ),
            Role::Client => matches!(
                action,
                ViewClients
                    | ViewWorkflow
                    | ToggleSubTask
                    | ViewDocuments
                    | UploadDocuments
                    | ViewEmailHistory
            ),
        }
    }

    /// Roles an access key holder may hand out.
    pub fn can_grant(self, other: Role) -> bool {
        match self {
            Role::SuperAdmin => true,
            Role::Admin => other != Role::SuperAdmin,
            Role::Operator | Role::Client => false,
        }
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub key_id: Uuid,
    pub role: Role,
    /// Tenant the key is bound to. `None` only for super admins.
    pub tenant_id: Option<TenantId>,
    /// Client the key is bound to. Set only for client keys.
    pub client_id: Option<ClientId>,
}

impl Principal {
    /// Check a tenant-level action.
    pub fn authorize(&self, tenant_id: &TenantId, action: Action) -> Result<(), AccessError> {
        if !self.role.allows(action) {
            return Err(AccessError::Forbidden(action.to_string()));
        }
        match self.role {
            Role::SuperAdmin => Ok(()),
            _ if self.tenant_id.as_ref() == Some(tenant_id) => Ok(()),
            _ => Err(AccessError::WrongTenant),
        }
    }

    /// Check an action on one client's case. Client keys may only touch
    /// their own case.
    pub fn authorize_client(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        action: Action,
    ) -> Result<(), AccessError> {
        self.authorize(tenant_id, action)?;
        if self.role == Role::Client && self.client_id.as_ref() != Some(client_id) {
            return Err(AccessError::WrongClient);
        }
        Ok(())
    }

    /// Global actions (tenant management) are reserved to super admins.
    pub fn authorize_global(&self, action: Action) -> Result<(), AccessError> {
        if self.role.allows(action) && self.role == Role::SuperAdmin {
            Ok(())
        } else {
            Err(AccessError::Forbidden(action.to_string()))
        }
    }
}

/// Stored access key (the plaintext is never persisted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKey {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    pub client_id: Option<ClientId>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AccessKey {
    pub fn principal(&self) -> Principal {
        Principal {
            key_id: self.id,
            role: self.role,
            tenant_id: self.tenant_id.clone(),
            client_id: self.client_id.clone(),
        }
    }
}

/// Request to issue a new tenant-scoped key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccessKeyRequest {
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub client_id: Option<ClientId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role, tenant: Option<&TenantId>, client: Option<&ClientId>) -> Principal {
        Principal {
            key_id: Uuid::now_v7(),
            role,
            tenant_id: tenant.cloned(),
            client_id: client.cloned(),
        }
    }

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::SuperAdmin, Role::Admin, Role::Operator, Role::Client] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
        assert_eq!("super-admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_action_display_uses_snake_case() {
        assert_eq!(Action::ResetWorkflow.to_string(), "reset_workflow");
    }

    #[test]
    fn test_super_admin_any_tenant() {
        let p = principal(Role::SuperAdmin, None, None);
        assert!(p.authorize(&TenantId::new(), Action::ResetWorkflow).is_ok());
        assert!(p.authorize_global(Action::ManageTenants).is_ok());
    }

    #[test]
    fn test_admin_restricted_to_own_tenant() {
        let own = TenantId::new();
        let p = principal(Role::Admin, Some(&own), None);
        assert!(p.authorize(&own, Action::ManageTemplates).is_ok());
        assert!(matches!(
            p.authorize(&TenantId::new(), Action::ViewClients),
            Err(AccessError::WrongTenant)
        ));
        assert!(p.authorize_global(Action::ManageTenants).is_err());
    }

    #[test]
    fn test_operator_cannot_reset_or_manage_templates() {
        let own = TenantId::new();
        let p = principal(Role::Operator, Some(&own), None);
        assert!(p.authorize(&own, Action::ToggleStep).is_ok());
        assert!(p.authorize(&own, Action::SendEmails).is_ok());
        assert!(matches!(
            p.authorize(&own, Action::ResetWorkflow),
            Err(AccessError::Forbidden(_))
        ));
        assert!(p.authorize(&own, Action::ManageTemplates).is_err());
        assert!(p.authorize(&own, Action::DeleteClients).is_err());
    }

    #[test]
    fn test_client_only_own_case() {
        let tenant = TenantId::new();
        let me = ClientId::new();
        let p = principal(Role::Client, Some(&tenant), Some(&me));

        assert!(p.authorize_client(&tenant, &me, Action::ToggleSubTask).is_ok());
        assert!(p.authorize_client(&tenant, &me, Action::ToggleStep).is_err());
        assert!(matches!(
            p.authorize_client(&tenant, &ClientId::new(), Action::ViewWorkflow),
            Err(AccessError::WrongClient)
        ));
    }

    #[test]
    fn test_grant_rules() {
        assert!(Role::Admin.can_grant(Role::Operator));
        assert!(!Role::Admin.can_grant(Role::SuperAdmin));
        assert!(!Role::Operator.can_grant(Role::Client));
    }

    #[test]
    fn test_access_key_hash_not_serialized() {
        let key = AccessKey {
            id: Uuid::now_v7(),
            name: "front desk".to_string(),
            key_hash: "deadbeef".to_string(),
            role: Role::Operator,
            tenant_id: Some(TenantId::new()),
            client_id: None,
            created_at: Utc::now(),
            last_used_at: None,
        };
        let json = serde_json::to_value(&key).unwrap();
        assert!(json.get("key_hash").is_none());
        assert_eq!(json["role"], "operator");
    }
}
