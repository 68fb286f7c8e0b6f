//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (firerange-infra) implements. The core crate never depends on any
//! specific storage technology. Every tenant-scoped call takes the tenant id
//! explicitly so one tenant can never read another tenant's rows.

pub mod access_key;
pub mod client;
pub mod document;
pub mod email;
pub mod tenant;
pub mod workflow;

/// Sort order for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}
