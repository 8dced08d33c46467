//! Compiled module manifest: action descriptors plus their argument validators.
//!
//! Built once per module on first dispatch and cached by the registry.

use crate::tools::module::{ActionDescriptor, ModuleError};
use serde_json::Value;

/// Why a module's manifest could not be built.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error("invalid input schema for '{action}': {detail}")]
    Schema { action: String, detail: String },
}

/// One action with its compiled input schema.
pub struct CompiledAction {
    pub descriptor: ActionDescriptor,
    validator: jsonschema::Validator,
}

impl CompiledAction {
    /// Schema violations, one message each. Empty when the arguments conform.
    pub fn violations(&self, arguments: &Value) -> Vec<String> {
        self.validator
            .iter_errors(arguments)
            .map(|e| e.to_string())
            .collect()
    }
}

/// All actions of one module, in declaration order.
pub struct Manifest {
    actions: Vec<CompiledAction>,
}

impl std::fmt::Debug for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manifest")
            .field(
                "actions",
                &self.actions.iter().map(|a| a.descriptor.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Manifest {
    pub fn compile(descriptors: Vec<ActionDescriptor>) -> Result<Self, ManifestError> {
        let actions = descriptors
            .into_iter()
            .map(|descriptor| {
                let validator = jsonschema::validator_for(&descriptor.input_schema).map_err(|e| {
                    ManifestError::Schema {
                        action: descriptor.name.clone(),
                        detail: e.to_string(),
                    }
                })?;
                Ok(CompiledAction {
                    descriptor,
                    validator,
                })
            })
            .collect::<Result<Vec<_>, ManifestError>>()?;
        Ok(Self { actions })
    }

    pub fn action(&self, name: &str) -> Option<&CompiledAction> {
        self.actions.iter().find(|a| a.descriptor.name == name)
    }
}
