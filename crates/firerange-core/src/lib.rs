//! Workflow engine, business logic and repository trait definitions for
//! Fire Range.
//!
//! This crate defines the "ports" (repository, storage and mailer traits)
//! that the infrastructure layer implements. It depends only on
//! `firerange-types` -- never on `firerange-infra` or any database/IO crate.

pub mod mail;
pub mod repository;
pub mod service;
pub mod storage;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
