//! Built-in tool modules and the production registry.

pub mod n8n;

pub use n8n::N8nModule;

use crate::backend::N8nClient;
use crate::tools::ModuleRegistry;
use crate::types::{Config, Result};
use std::sync::Arc;

/// Build the registry served by this process.
pub fn builtin_registry(config: &Config) -> Result<ModuleRegistry> {
    let client = N8nClient::new(&config.n8n)?;
    let base_url = client.base_url().to_string();

    let mut registry = ModuleRegistry::new();
    registry.register("n8n", N8nModule::new(Arc::new(client), base_url))?;

    tracing::info!(modules = ?registry.ids().collect::<Vec<_>>(), "Module registry ready");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::build_catalog;

    #[test]
    fn test_builtin_registry() {
        let registry = builtin_registry(&Config::default()).unwrap();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["n8n"]);
        let tools = build_catalog(&registry).unwrap();
        assert!(tools.iter().all(|t| t.name.starts_with("n8n:")));
    }

    #[test]
    fn test_bad_backend_url_fails_startup() {
        let mut config = Config::default();
        config.n8n.base_url = "::not-a-url".to_string();
        assert!(builtin_registry(&config).is_err());
    }
}
