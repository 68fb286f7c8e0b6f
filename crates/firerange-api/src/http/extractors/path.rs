//! Path parameter extractors for client-scoped routes.
//!
//! Every route also carries the `{tenant}` segment; it is resolved by
//! [`TenantContext`](super::auth::TenantContext) and ignored here. Ids that
//! do not parse are reported as not found, the same as unknown ids.

use serde::Deserialize;
use uuid::Uuid;

use firerange_types::client::ClientId;
use firerange_types::error::{ClientError, DocumentError};

use crate::http::error::AppError;

fn parse_client_id(raw: &str) -> Result<ClientId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Client(ClientError::NotFound))
}

/// `/{tenant}/clients/{client_id}`
#[derive(Debug, Deserialize)]
pub struct ClientPath {
    pub client_id: String,
}

impl ClientPath {
    pub fn client_id(&self) -> Result<ClientId, AppError> {
        parse_client_id(&self.client_id)
    }
}

/// `/{tenant}/clients/{client_id}/workflow/steps/{step_id}`
#[derive(Debug, Deserialize)]
pub struct StepPath {
    pub client_id: String,
    pub step_id: String,
}

impl StepPath {
    pub fn client_id(&self) -> Result<ClientId, AppError> {
        parse_client_id(&self.client_id)
    }
}

/// `/{tenant}/clients/{client_id}/workflow/steps/{step_id}/sub-tasks/{sub_task_id}`
#[derive(Debug, Deserialize)]
pub struct SubTaskPath {
    pub client_id: String,
    pub step_id: String,
    pub sub_task_id: String,
}

impl SubTaskPath {
    pub fn client_id(&self) -> Result<ClientId, AppError> {
        parse_client_id(&self.client_id)
    }
}

/// `/{tenant}/clients/{client_id}/emails/{template_key}`
#[derive(Debug, Deserialize)]
pub struct EmailPath {
    pub client_id: String,
    pub template_key: String,
}

impl EmailPath {
    pub fn client_id(&self) -> Result<ClientId, AppError> {
        parse_client_id(&self.client_id)
    }
}

/// `/{tenant}/clients/{client_id}/documents/{document_id}`
#[derive(Debug, Deserialize)]
pub struct DocumentPath {
    pub client_id: String,
    pub document_id: String,
}

impl DocumentPath {
    pub fn client_id(&self) -> Result<ClientId, AppError> {
        parse_client_id(&self.client_id)
    }

    pub fn document_id(&self) -> Result<Uuid, AppError> {
        self.document_id
            .parse()
            .map_err(|_| AppError::Document(DocumentError::NotFound))
    }
}

/// `/{tenant}/templates/{key}`
#[derive(Debug, Deserialize)]
pub struct TemplatePath {
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_ids_are_not_found() {
        let path = DocumentPath {
            client_id: "nope".to_string(),
            document_id: "also-nope".to_string(),
        };
        assert!(matches!(path.client_id(), Err(AppError::Client(ClientError::NotFound))));
        assert!(matches!(
            path.document_id(),
            Err(AppError::Document(DocumentError::NotFound))
        ));

        let id = ClientId::new();
        let path = ClientPath {
            client_id: id.to_string(),
        };
        assert_eq!(path.client_id().unwrap(), id);
    }
}
