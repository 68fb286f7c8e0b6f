//! Observability setup for Fire Range: tracing subscriber installation and
//! optional OpenTelemetry span export.

pub mod tracing_setup;
