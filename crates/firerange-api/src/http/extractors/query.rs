//! Query parameter extractors.

use serde::Deserialize;

use firerange_core::repository::SortOrder;
use firerange_core::repository::client::ClientFilter;

/// Query parameters for the client list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct ClientListQuery {
    /// Case-insensitive name search.
    pub search: Option<String>,
    /// Sort order on the name (asc, desc).
    #[serde(default = "default_order")]
    pub order: String,
    /// Maximum results.
    pub limit: Option<i64>,
    /// Offset for pagination.
    pub offset: Option<i64>,
}

fn default_order() -> String {
    "asc".to_string()
}

impl ClientListQuery {
    pub fn into_filter(self) -> ClientFilter {
        let sort_order = match self.order.to_lowercase().as_str() {
            "desc" => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        ClientFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            sort_order: Some(sort_order),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Query parameters for the raw-body document upload.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
    /// Workflow step the document belongs to.
    pub step_id: Option<String>,
}

/// Query parameters for sending an email.
#[derive(Debug, Deserialize, Default)]
pub struct SendQuery {
    /// Send again even if the template was already sent to the client.
    #[serde(default)]
    pub resend: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_list_query_into_filter() {
        let query = ClientListQuery {
            search: Some("  ".to_string()),
            order: "DESC".to_string(),
            limit: Some(10),
            offset: None,
        };
        let filter = query.into_filter();
        assert!(filter.search.is_none());
        assert_eq!(filter.sort_order, Some(SortOrder::Desc));
        assert_eq!(filter.limit, Some(10));
    }
}
