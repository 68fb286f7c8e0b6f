//! HTTP/REST API layer for Fire Range.
//!
//! Axum-based REST API at `/api/v1/` with access key authentication,
//! tenant resolution from the first path segment, envelope response format
//! and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
