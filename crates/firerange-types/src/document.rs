//! Client document types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ClientId;
use crate::tenant::TenantId;

/// Default upload limit per document (20 MiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Metadata of a document uploaded for a client. The bytes live in the
/// document store under the document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDocument {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub client_id: ClientId,
    /// Workflow step the document was collected for, if any.
    pub step_id: Option<String>,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_max_document_bytes() {
        assert_eq!(DEFAULT_MAX_DOCUMENT_BYTES, 20_971_520);
    }
}
