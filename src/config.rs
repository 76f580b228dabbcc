//! Tunables for validation and backend mapping.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    pub validation: ValidationConfig,
    pub mapping: MappingConfig,
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::config("C001", format!("Failed to parse config JSON: {}", e)))
    }
}

/// How dynamic references are checked against execution order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceOrder {
    /// The referenced node must sit at a lower index in the flat node list.
    #[default]
    Linear,
    /// The referenced node must have a path to the referencing node through
    /// sequence, branch and loop links.
    Topology,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationConfig {
    pub reference_order: ReferenceOrder,
    /// Unconfigured optional parameters are only warned about when a node has
    /// fewer than this many of them.
    pub optional_warning_limit: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            reference_order: ReferenceOrder::Linear,
            optional_warning_limit: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MappingConfig {
    pub max_retries: u32,
    pub timeout_seconds: u32,
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig {
            max_retries: 3,
            timeout_seconds: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = CoreConfig::from_json("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.validation.optional_warning_limit, 3);
        assert_eq!(config.mapping.timeout_seconds, 300);
    }

    #[test]
    fn partial_override() {
        let config =
            CoreConfig::from_json(r#"{"validation":{"referenceOrder":"topology"}}"#).unwrap();
        assert_eq!(config.validation.reference_order, ReferenceOrder::Topology);
        assert_eq!(config.validation.optional_warning_limit, 3);
        assert_eq!(config.mapping.max_retries, 3);
    }

    #[test]
    fn malformed_config_is_c001() {
        let err = CoreConfig::from_json("[1,2]").unwrap_err();
        assert_eq!(err.code, "C001");
    }
}
