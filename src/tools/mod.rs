//! Tool gateway core: module contract, registry, catalog, dispatch, health.
//!
//! Modules own their actions and backend calls. Everything in here is
//! transport-agnostic and stateless apart from the read-only registry.

pub mod catalog;
pub mod dispatch;
pub mod health;
pub mod manifest;
pub mod module;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::build_catalog;
pub use dispatch::dispatch;
pub use health::{aggregate, HealthReport, HealthSummary, OverallHealth, DEFAULT_PROBE_TIMEOUT};
pub use module::{
    input_schema, ActionDescriptor, ContentBlock, HealthState, HealthStatus, ModuleError,
    ToolDescriptor, ToolModule, ToolResult,
};
pub use manifest::{Manifest, ManifestError};
pub use registry::ModuleRegistry;
