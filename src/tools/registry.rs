//! Module registry: fixed mapping from module id to tool module.
//!
//! Populated once at startup, then shared read-only behind an `Arc`. Each
//! module's compiled manifest is cached on first use.

use crate::tools::manifest::{Manifest, ManifestError};
use crate::tools::module::ToolModule;
use crate::types::{Error, ModuleId, Result};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

struct Entry {
    id: ModuleId,
    module: Box<dyn ToolModule>,
    manifest: OnceLock<Arc<Manifest>>,
}

/// Registered modules in registration order.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. Duplicate ids are a configuration error.
    pub fn register(&mut self, id: &str, module: impl ToolModule + 'static) -> Result<()> {
        let id = ModuleId::new(id)?;
        if self.index.contains_key(id.as_str()) {
            return Err(Error::config(format!("duplicate module id: {}", id)));
        }
        tracing::debug!(module = %id, "Registered tool module");
        self.index.insert(id.as_str().to_string(), self.entries.len());
        self.entries.push(Entry {
            id,
            module: Box::new(module),
            manifest: OnceLock::new(),
        });
        Ok(())
    }

    fn entry(&self, id: &str) -> Option<&Entry> {
        self.index.get(id).and_then(|&i| self.entries.get(i))
    }

    /// Look up a module by id.
    pub fn resolve(&self, id: &str) -> Option<&dyn ToolModule> {
        self.entry(id).map(|e| e.module.as_ref())
    }

    /// Compiled manifest of a module, or `None` for an unknown id.
    ///
    /// Only a successful build is cached; a failing module is asked again on
    /// the next call.
    pub fn manifest(
        &self,
        id: &str,
    ) -> Option<std::result::Result<Arc<Manifest>, ManifestError>> {
        let entry = self.entry(id)?;
        if let Some(manifest) = entry.manifest.get() {
            return Some(Ok(manifest.clone()));
        }
        let built = entry
            .module
            .list_descriptors()
            .map_err(ManifestError::from)
            .and_then(Manifest::compile)
            .map(Arc::new);
        Some(built.map(|m| entry.manifest.get_or_init(|| m).clone()))
    }

    /// All `(id, module)` pairs in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&ModuleId, &dyn ToolModule)> {
        self.entries.iter().map(|e| (&e.id, e.module.as_ref()))
    }

    /// Module ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{BrokenModule, CountingModule, EchoModule};
    use std::sync::atomic::Ordering;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ModuleRegistry::new();
        registry.register("echo", EchoModule).unwrap();

        assert!(registry.resolve("echo").is_some());
        assert!(registry.resolve("nomodule").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = ModuleRegistry::new();
        registry.register("echo", EchoModule).unwrap();
        let err = registry.register("echo", EchoModule).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("duplicate")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_ids_rejected() {
        let mut registry = ModuleRegistry::new();
        assert!(registry.register("", EchoModule).is_err());
        assert!(registry.register("a:b", EchoModule).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_entries_keep_registration_order() {
        let mut registry = ModuleRegistry::new();
        for id in ["zeta", "alpha", "mid"] {
            registry.register(id, EchoModule).unwrap();
        }
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_manifest_built_once() {
        let module = CountingModule::default();
        let calls = module.manifest_calls.clone();
        let mut registry = ModuleRegistry::new();
        registry.register("count", module).unwrap();

        let first = registry.manifest("count").unwrap().unwrap();
        let second = registry.manifest("count").unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.manifest("nomodule").is_none());
    }

    #[test]
    fn test_failed_manifest_not_cached() {
        let mut registry = ModuleRegistry::new();
        registry.register("broken", BrokenModule).unwrap();
        for _ in 0..2 {
            let err = registry.manifest("broken").unwrap().unwrap_err();
            assert!(matches!(err, ManifestError::Module(_)));
        }
    }
}
