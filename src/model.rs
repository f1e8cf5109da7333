//! Extracted schema models
//!
//! `TypeModel` and `PropertyModel` are the immutable, structurally comparable
//! snapshots the emitters work from. Structural equality is the cache key.

use crate::schema::Accessibility;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Emission strategy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Builder,
    Fluent,
    Deconstruct,
    Cloneable,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Builder,
        Strategy::Fluent,
        Strategy::Deconstruct,
        Strategy::Cloneable,
    ];

    /// Lowercase name, used in artifact names and logs
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Builder => "builder",
            Strategy::Fluent => "fluent",
            Strategy::Deconstruct => "deconstruct",
            Strategy::Cloneable => "cloneable",
        }
    }

    /// Type-level attribute that requests this strategy
    pub fn marker(self) -> &'static str {
        match self {
            Strategy::Builder => "AutoClassBuilder",
            Strategy::Fluent => "FluentClass",
            Strategy::Deconstruct => "Deconstruct",
            Strategy::Cloneable => "Cloneable",
        }
    }

    /// Name of the hand-written method that replaces generation
    pub fn default_override_method(self) -> &'static str {
        match self {
            Strategy::Builder => "Build",
            Strategy::Fluent => "Fluent",
            Strategy::Deconstruct => "Deconstruct",
            Strategy::Cloneable => "Clone",
        }
    }

    /// Strategies that add `partial` members to the type itself
    pub fn requires_partial(self) -> bool {
        matches!(self, Strategy::Fluent | Strategy::Cloneable)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Strategy::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s) || st.marker().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::Error::Config(format!("unknown strategy '{}'", s)))
    }
}

/// Declarative property markers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Markers {
    pub exclude: bool,
    pub skip_builder: bool,
    pub skip_clone: bool,
    pub skip_fluent: bool,
    pub include_in_deconstruct: bool,
    pub deep_clone: bool,
}

/// Single-argument generic container facts for a property type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Simple container name (`List`, `IEnumerable`, `HashSet`)
    pub container: String,
    /// Fully-qualified display of the element type
    pub element: String,
    /// Element is a class that qualifies as cloneable on its own
    pub element_cloneable: bool,
}

/// Resolved facts about a property's declared type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeFacts {
    pub is_value_type: bool,
    pub nullable: bool,
    /// Qualified name of the declared type when it is part of the compilation
    pub declared_in_compilation: Option<String>,
    /// Fully-qualified builder class name when the type is builder-annotated
    pub nested_builder: Option<String>,
    pub container: Option<ContainerInfo>,
}

/// A property as extracted from one level of the inheritance chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyModel {
    pub name: String,
    /// 0 for the type itself, 1 for its base, and so on
    pub depth: usize,
    pub declaring_type: String,
    /// Fully-qualified display of the property type
    pub type_name: String,
    pub getter: Option<Accessibility>,
    pub setter: Option<Accessibility>,
    pub init_only: bool,
    pub markers: Markers,
    pub facts: TypeFacts,
}

impl PropertyModel {
    pub fn has_public_getter(&self) -> bool {
        self.getter == Some(Accessibility::Public)
    }

    pub fn has_public_setter(&self) -> bool {
        self.setter == Some(Accessibility::Public)
    }
}

/// Whether instances are values or references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeShape {
    Reference,
    Value,
}

/// An extracted type, ready for emission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeModel {
    pub name: String,
    pub namespace: Option<String>,
    /// `global::Ns.Name`
    pub fully_qualified_name: String,
    /// Generic parameter names in declaration order
    pub generic_parameters: Vec<String>,
    /// Rendered `where` clauses, one per constrained parameter
    pub constraints: Vec<String>,
    pub shape: TypeShape,
    pub accessibility: Accessibility,
    pub is_partial: bool,
    pub is_record: bool,
    pub properties: Vec<PropertyModel>,
}

impl TypeModel {
    pub fn is_value_type(&self) -> bool {
        self.shape == TypeShape::Value
    }

    /// `<T, U>` or empty
    pub fn generic_suffix(&self) -> String {
        if self.generic_parameters.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.generic_parameters.join(", "))
        }
    }

    /// Name with generic parameters, as used in type positions
    pub fn display_name(&self) -> String {
        format!("{}{}", self.name, self.generic_suffix())
    }

    /// `Ns.Name` without the `global::` alias
    pub fn qualified_name(&self) -> String {
        crate::schema::qualify(self.namespace.as_deref(), &self.name)
    }

    /// `type` keyword used for partial re-declarations
    pub fn type_keyword(&self) -> &'static str {
        match (self.is_record, self.shape) {
            (true, TypeShape::Value) => "record struct",
            (true, TypeShape::Reference) => "record",
            (false, TypeShape::Value) => "struct",
            (false, TypeShape::Reference) => "class",
        }
    }

    /// Stable content fingerprint: `sha256:` plus 16 hex characters
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let content = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
    }
}
