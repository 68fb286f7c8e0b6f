//! HTTP request handlers for the REST API.

pub mod client;
pub mod document;
pub mod email;
pub mod key;
pub mod stats;
pub mod template;
pub mod tenant;
pub mod workflow;
