//! Tool catalog: flattened, namespaced view over every registered module.
//!
//! Built fresh on each request. A module whose manifest cannot be produced
//! fails the whole catalog; callers never see a partial list.

use crate::tools::module::ToolDescriptor;
use crate::tools::registry::ModuleRegistry;
use crate::types::{qualify, Error, Result, DELIMITER};
use std::collections::HashSet;

/// Build the catalog: modules in registration order, each module's actions in
/// its own order, every name qualified as `<module>:<action>`.
pub fn build_catalog(registry: &ModuleRegistry) -> Result<Vec<ToolDescriptor>> {
    let mut tools = Vec::new();

    for (id, module) in registry.entries() {
        let descriptors = module.list_descriptors().map_err(|e| {
            tracing::error!(module = %id, error = %e, "Module failed to list tools");
            Error::internal(format!("module '{}' failed to list tools: {}", id, e))
        })?;

        let mut seen = HashSet::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if descriptor.name.is_empty() || descriptor.name.contains(DELIMITER) {
                return Err(Error::internal(format!(
                    "module '{}' declared invalid action name '{}'",
                    id, descriptor.name
                )));
            }
            if !seen.insert(descriptor.name.clone()) {
                return Err(Error::internal(format!(
                    "module '{}' declared action '{}' twice",
                    id, descriptor.name
                )));
            }
            tools.push(ToolDescriptor {
                name: qualify(id, &descriptor.name),
                description: descriptor.description,
                input_schema: descriptor.input_schema,
            });
        }
    }

    Ok(tools)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::module::{ActionDescriptor, HealthStatus, ModuleError, ToolModule, ToolResult};
    use crate::tools::testing::{BrokenModule, EchoModule, NoArgs};
    use async_trait::async_trait;
    use serde_json::Value;

    #[derive(Debug)]
    struct FixedModule(Vec<&'static str>);

    #[async_trait]
    impl ToolModule for FixedModule {
        fn list_descriptors(&self) -> std::result::Result<Vec<ActionDescriptor>, ModuleError> {
            Ok(self
                .0
                .iter()
                .map(|name| ActionDescriptor::for_args::<NoArgs>(*name, "fixed"))
                .collect())
        }

        async fn invoke(
            &self,
            action: &str,
            _arguments: Value,
        ) -> std::result::Result<ToolResult, ModuleError> {
            Ok(ToolResult::success(action))
        }

        async fn probe_health(&self) -> std::result::Result<HealthStatus, ModuleError> {
            Ok(HealthStatus::healthy("fixed"))
        }
    }

    fn names(tools: &[ToolDescriptor]) -> Vec<&str> {
        tools.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_echo_catalog() {
        let mut registry = ModuleRegistry::new();
        registry.register("echo", EchoModule).unwrap();

        let tools = build_catalog(&registry).unwrap();
        assert_eq!(
            names(&tools),
            vec!["echo:ping", "echo:echo", "echo:boom", "echo:panic"]
        );
        assert_eq!(tools[0].description, "Reply with pong");
        assert_eq!(tools[0].input_schema["type"], "object");
    }

    #[test]
    fn test_grouped_by_module_in_registration_order() {
        let mut registry = ModuleRegistry::new();
        registry.register("b", FixedModule(vec!["z", "a"])).unwrap();
        registry.register("a", FixedModule(vec!["m"])).unwrap();

        let tools = build_catalog(&registry).unwrap();
        assert_eq!(names(&tools), vec!["b:z", "b:a", "a:m"]);
    }

    #[test]
    fn test_failing_module_fails_whole_catalog() {
        let mut registry = ModuleRegistry::new();
        registry.register("echo", EchoModule).unwrap();
        registry.register("broken", BrokenModule).unwrap();

        let err = build_catalog(&registry).unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(err.to_string().contains("manifest unavailable"));
    }

    #[test]
    fn test_rejects_action_names_with_delimiter() {
        let mut registry = ModuleRegistry::new();
        registry.register("bad", FixedModule(vec!["a:b"])).unwrap();
        assert!(build_catalog(&registry).is_err());
    }

    #[test]
    fn test_rejects_duplicate_actions() {
        let mut registry = ModuleRegistry::new();
        registry.register("dup", FixedModule(vec!["x", "x"])).unwrap();
        assert!(build_catalog(&registry).is_err());
    }

    #[test]
    fn test_catalog_is_idempotent() {
        let mut registry = ModuleRegistry::new();
        registry.register("echo", EchoModule).unwrap();
        registry.register("fixed", FixedModule(vec!["one", "two"])).unwrap();

        let first = build_catalog(&registry).unwrap();
        let second = build_catalog(&registry).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_registry_yields_empty_catalog() {
        let registry = ModuleRegistry::new();
        assert!(build_catalog(&registry).unwrap().is_empty());
    }
}
