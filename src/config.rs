//! Generator configuration
//!
//! Loaded from YAML or JSON; every field has a default, so an empty document
//! is a valid configuration.
//!
//! ```yaml
//! strategies: [builder, cloneable]
//! indentation: tab
//! provenance: false
//! artifact_name: "{{ name | safe_class_name }}.{{ strategy }}.g.cs"
//! override_methods:
//!   cloneable: CloneMe
//! parallel: false
//! ```

use crate::error::{Error, Result};
use crate::model::Strategy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Settings for a generation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratorConfig {
    /// Strategies to run; a type still needs the matching marker
    #[serde(default = "default_strategies")]
    pub strategies: Vec<Strategy>,

    /// Indentation of emitted code
    #[serde(default)]
    pub indentation: Indentation,

    /// Write the model fingerprint into the artifact header
    #[serde(default = "default_true")]
    pub provenance: bool,

    /// Emit `#nullable enable`
    #[serde(default = "default_true")]
    pub nullable_context: bool,

    /// MiniJinja template for artifact hint names.
    /// Variables: `name`, `namespace`, `strategy`, `fully_qualified_name`
    #[serde(default = "default_artifact_name")]
    pub artifact_name: String,

    /// Hand-written method names that suppress each strategy
    #[serde(default)]
    pub override_methods: OverrideMethods,

    /// Run independent requests on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

/// Indentation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Indentation {
    Tab,
    Spaces(usize),
}

impl Default for Indentation {
    fn default() -> Self {
        Indentation::Spaces(4)
    }
}

/// Method names looked up by the override gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OverrideMethods {
    #[serde(default = "default_builder_method")]
    pub builder: String,
    #[serde(default = "default_fluent_method")]
    pub fluent: String,
    #[serde(default = "default_deconstruct_method")]
    pub deconstruct: String,
    #[serde(default = "default_cloneable_method")]
    pub cloneable: String,
}

fn default_strategies() -> Vec<Strategy> {
    Strategy::ALL.to_vec()
}

fn default_true() -> bool {
    true
}

fn default_artifact_name() -> String {
    "{% if namespace %}{{ namespace }}.{% endif %}{{ name | safe_class_name }}.{{ strategy }}.g.cs"
        .to_string()
}

fn default_builder_method() -> String {
    Strategy::Builder.default_override_method().to_string()
}

fn default_fluent_method() -> String {
    Strategy::Fluent.default_override_method().to_string()
}

fn default_deconstruct_method() -> String {
    Strategy::Deconstruct.default_override_method().to_string()
}

fn default_cloneable_method() -> String {
    Strategy::Cloneable.default_override_method().to_string()
}

impl Default for OverrideMethods {
    fn default() -> Self {
        Self {
            builder: default_builder_method(),
            fluent: default_fluent_method(),
            deconstruct: default_deconstruct_method(),
            cloneable: default_cloneable_method(),
        }
    }
}

impl OverrideMethods {
    pub fn get(&self, strategy: Strategy) -> &str {
        match strategy {
            Strategy::Builder => &self.builder,
            Strategy::Fluent => &self.fluent,
            Strategy::Deconstruct => &self.deconstruct,
            Strategy::Cloneable => &self.cloneable,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            indentation: Indentation::default(),
            provenance: true,
            nullable_context: true,
            artifact_name: default_artifact_name(),
            override_methods: OverrideMethods::default(),
            parallel: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn is_enabled(&self, strategy: Strategy) -> bool {
        self.strategies.contains(&strategy)
    }

    /// Reject configurations a pass cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            return Err(Error::Config("at least one strategy must be enabled".into()));
        }
        if self.indentation == Indentation::Spaces(0) {
            return Err(Error::Config("indentation must be a tab or at least one space".into()));
        }
        for strategy in Strategy::ALL {
            let name = self.override_methods.get(strategy);
            if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(Error::Config(format!(
                    "override method for {} is not an identifier: '{}'",
                    strategy, name
                )));
            }
        }
        crate::templates::artifact_name(&self.artifact_name, &crate::templates::sample_context())
            .map_err(|e| Error::Config(format!("artifact_name: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = GeneratorConfig::from_yaml("{}").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.override_methods.get(Strategy::Cloneable), "Clone");
    }

    #[test]
    fn test_partial_override_methods() {
        let config = GeneratorConfig::from_yaml(
            r#"
strategies: [builder, deconstruct]
indentation: tab
override_methods:
  deconstruct: Split
parallel: false
"#,
        )
        .unwrap();
        assert_eq!(config.indentation, Indentation::Tab);
        assert!(config.is_enabled(Strategy::Builder));
        assert!(!config.is_enabled(Strategy::Fluent));
        assert_eq!(config.override_methods.get(Strategy::Deconstruct), "Split");
        assert_eq!(config.override_methods.get(Strategy::Builder), "Build");
        assert!(!config.parallel);
    }

    #[test]
    fn test_spaces_from_json() {
        let config = GeneratorConfig::from_json(r#"{"indentation": {"spaces": 2}}"#).unwrap();
        assert_eq!(config.indentation, Indentation::Spaces(2));
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let mut config = GeneratorConfig {
            strategies: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.strategies = vec![Strategy::Builder];
        config.artifact_name = "{{ name ".into();
        assert!(config.validate().is_err());

        config.artifact_name = default_artifact_name();
        config.override_methods.builder = "Build Me".into();
        assert!(config.validate().is_err());
    }
}
