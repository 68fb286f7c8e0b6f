//! Business logic services (use cases).
//!
//! Services orchestrate repository calls, storage, mail delivery and
//! business rules. They depend on traits (ports) -- never on concrete
//! infrastructure implementations.

pub mod access;
pub mod client;
pub mod document;
pub mod email;
pub mod hash;
pub mod tenant;
pub mod workflow;
