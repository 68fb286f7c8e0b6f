//! Request extractors: authentication, tenant resolution, path and query
//! parameters.

pub mod auth;
pub mod path;
pub mod query;
