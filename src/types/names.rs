//! Tool naming: module ids and `<module>:<action>` qualified names.
//!
//! Names are validated at construction time. A qualified name is split on the
//! FIRST delimiter; because action names are rejected if they contain the
//! delimiter, a catalog name always parses back into the same pair.

use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between module id and action name.
pub const DELIMITER: char = ':';

/// Short identifier a module is registered under (`n8n`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::config("module id cannot be empty"));
        }
        if id.contains(DELIMITER) {
            return Err(Error::config(format!(
                "module id '{}' must not contain '{}'",
                id, DELIMITER
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ModuleId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        id.0
    }
}

/// A parsed `<module>:<action>` tool name, borrowing from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    pub module: &'a str,
    pub action: &'a str,
}

impl<'a> QualifiedName<'a> {
    /// Split on the first delimiter. Both sides must be non-empty.
    pub fn parse(name: &'a str) -> Result<Self> {
        match name.split_once(DELIMITER) {
            Some((module, action)) if !module.is_empty() && !action.is_empty() => {
                Ok(Self { module, action })
            }
            _ => Err(Error::invalid_params(format!(
                "malformed tool name: '{}' (expected <module>{}<action>)",
                name, DELIMITER
            ))),
        }
    }
}

/// Build the externally visible name for an action of a module.
pub fn qualify(module: &ModuleId, action: &str) -> String {
    format!("{}{}{}", module, DELIMITER, action)
}
