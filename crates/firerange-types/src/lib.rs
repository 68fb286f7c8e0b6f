//! Shared domain types for Fire Range.
//!
//! This crate contains the domain types used across the case-management
//! platform: tenants, clients, workflows, email templates, documents, access
//! keys, configuration and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod access;
pub mod client;
pub mod config;
pub mod document;
pub mod email;
pub mod error;
pub mod tenant;
pub mod workflow;
