//! Client workflow: the state engine and the canonical template.

pub mod engine;
pub mod template;

pub use engine::{WorkflowEngine, progress_of};
pub use template::{active_template, builtin_template};
