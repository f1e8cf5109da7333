//! Host declaration model, the input to a generation pass
//!
//! A `Compilation` is the set of type declarations and hand-written method
//! declarations the host hands to the generator. It can be written by hand in
//! YAML/JSON, or produced from C# source by [`crate::parse`].
//!
//! ## Example
//!
//! ```yaml
//! types:
//!   - name: Address
//!     namespace: Demo.Models
//!     attributes: [AutoClassBuilder]
//!     properties:
//!       - name: City
//!         type: string?
//!       - name: ZipCode
//!         type: string?
//!
//!   - name: Person
//!     namespace: Demo.Models
//!     attributes: [Deconstruct]
//!     properties:
//!       - name: FirstName
//!         type: string?
//!         attributes: [IncludeInDeconstruct]
//!       - name: Age
//!         type: int
//!         set: { accessibility: private }
//! ```
//!
//! Property accessors default to "present, with the property's
//! accessibility". Use `set: null` for a get-only property and
//! `set: { init: true }` for an init-only one.

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A set of declarations visible to one generation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(
    title = "schemagen Compilation",
    description = "Type and method declarations"
)]
pub struct Compilation {
    /// Type declarations. Entries sharing a qualified name are parts of one partial type.
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,

    /// Hand-written method declarations, used for override detection
    #[serde(default)]
    pub methods: Vec<MethodDeclaration>,
}

/// Declared accessibility of a type or member
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    Private,
}

impl Accessibility {
    /// C# keyword(s) for this accessibility
    pub fn keyword(self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Private => "private",
        }
    }

    pub fn is_public(self) -> bool {
        self == Accessibility::Public
    }
}

/// Kind of a declared type
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    #[default]
    Class,
    Record,
    Struct,
    RecordStruct,
    Interface,
}

impl DeclarationKind {
    pub fn is_value_type(self) -> bool {
        matches!(self, DeclarationKind::Struct | DeclarationKind::RecordStruct)
    }

    pub fn is_class(self) -> bool {
        matches!(self, DeclarationKind::Class | DeclarationKind::Record)
    }
}

/// Structural modifier on a type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Partial,
    Abstract,
    Sealed,
    Static,
    Readonly,
}

/// A generic type parameter with its constraints
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct GenericParameter {
    pub name: String,

    /// Constraint entries in source order, e.g. `class`, `new()`, `IComparable<T>`
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// A type declaration (one part, for partial types)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TypeDeclaration {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default)]
    pub kind: DeclarationKind,

    #[serde(default)]
    pub accessibility: Accessibility,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<GenericParameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<TypeRefRepr>")]
    pub base_type: Option<TypeRef>,

    /// Attribute names; namespace and `Attribute` suffix are optional
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,

    #[serde(default)]
    pub properties: Vec<PropertyDeclaration>,
}

impl TypeDeclaration {
    /// `Namespace.Name`, or just `Name` in the global namespace
    pub fn qualified_name(&self) -> String {
        qualify(self.namespace.as_deref(), &self.name)
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| normalize_attribute(a) == normalize_attribute(name))
    }
}

/// A property accessor (`get`, `set` or `init`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AccessorDeclaration {
    /// Accessor-level accessibility; inherits the property's when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Accessibility>,

    /// `init` instead of `set`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub init: bool,
}

fn inherited_accessor() -> Option<AccessorDeclaration> {
    Some(AccessorDeclaration::default())
}

/// A property declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyDeclaration {
    pub name: String,

    #[serde(rename = "type")]
    #[schemars(with = "TypeRefRepr")]
    pub ty: TypeRef,

    #[serde(default)]
    pub accessibility: Accessibility,

    #[serde(default = "inherited_accessor")]
    pub get: Option<AccessorDeclaration>,

    #[serde(default = "inherited_accessor")]
    pub set: Option<AccessorDeclaration>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_indexer: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

impl PropertyDeclaration {
    /// A public `{ get; set; }` property
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            accessibility: Accessibility::Public,
            get: inherited_accessor(),
            set: inherited_accessor(),
            is_static: false,
            is_indexer: false,
            attributes: Vec::new(),
        }
    }

    /// Effective getter accessibility, `None` when there is no getter
    pub fn getter(&self) -> Option<Accessibility> {
        self.get
            .as_ref()
            .map(|a| a.accessibility.unwrap_or(self.accessibility))
    }

    /// Effective setter accessibility, `None` when there is no setter
    pub fn setter(&self) -> Option<Accessibility> {
        self.set
            .as_ref()
            .map(|a| a.accessibility.unwrap_or(self.accessibility))
    }

    pub fn is_init_only(&self) -> bool {
        self.set.as_ref().map(|a| a.init).unwrap_or(false)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| normalize_attribute(a) == normalize_attribute(name))
    }
}

/// Parameter passing modifier
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ParameterModifier {
    #[default]
    None,
    This,
    Out,
    Ref,
    In,
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParameterDeclaration {
    pub name: String,

    #[serde(rename = "type")]
    #[schemars(with = "TypeRefRepr")]
    pub ty: TypeRef,

    #[serde(default)]
    pub modifier: ParameterModifier,
}

/// A hand-written method declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MethodDeclaration {
    pub name: String,

    /// Qualified (or simple) name of the type declaring the method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<String>,

    #[serde(default)]
    pub is_static: bool,

    #[serde(default)]
    pub parameters: Vec<ParameterDeclaration>,
}

impl MethodDeclaration {
    /// Static method whose first parameter carries `this`
    pub fn is_extension(&self) -> bool {
        self.is_static
            && self
                .parameters
                .first()
                .is_some_and(|p| p.modifier == ParameterModifier::This)
    }
}

impl Compilation {
    /// Parse a compilation from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::SchemaParse(e.to_string()))
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::SchemaParse(e.to_string()))
    }

    /// Parse a compilation from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::SchemaParse(e.to_string()))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::SchemaParse(e.to_string()))
    }

    /// JSON Schema describing the input format
    pub fn json_schema() -> Result<serde_json::Value> {
        Ok(serde_json::to_value(schemars::schema_for!(Compilation))?)
    }

    /// Append the declarations of another compilation
    pub fn merge(&mut self, other: Compilation) {
        self.types.extend(other.types);
        self.methods.extend(other.methods);
    }

    /// All declaration parts of the type with this qualified name, in order
    pub fn parts_of(&self, qualified_name: &str) -> Vec<&TypeDeclaration> {
        self.types
            .iter()
            .filter(|t| t.qualified_name() == qualified_name)
            .collect()
    }

    /// Resolve a type name as seen from `context_namespace`
    ///
    /// Qualified references match exactly. Simple names prefer the context
    /// namespace, then its enclosing namespaces, then the only declaration
    /// with that name anywhere.
    pub fn lookup(
        &self,
        namespace: Option<&str>,
        name: &str,
        context_namespace: Option<&str>,
    ) -> Option<&TypeDeclaration> {
        if let Some(ns) = namespace {
            let qualified = qualify(Some(ns), name);
            return self.types.iter().find(|t| t.qualified_name() == qualified);
        }

        let mut scope = context_namespace.map(str::to_string);
        while let Some(ns) = scope {
            if let Some(found) = self
                .types
                .iter()
                .find(|t| t.name == name && t.namespace.as_deref() == Some(ns.as_str()))
            {
                return Some(found);
            }
            scope = ns.rsplit_once('.').map(|(parent, _)| parent.to_string());
        }

        let mut candidates = self.types.iter().filter(|t| t.name == name);
        let first = candidates.next()?;
        if candidates.all(|t| t.qualified_name() == first.qualified_name()) {
            Some(first)
        } else {
            None
        }
    }
}

/// Strip a namespace prefix and the `Attribute` suffix
///
/// ```
/// use schemagen::schema::normalize_attribute;
/// assert_eq!(normalize_attribute("Demo.Attributes.CloneableAttribute"), "Cloneable");
/// assert_eq!(normalize_attribute("Cloneable"), "Cloneable");
/// ```
pub fn normalize_attribute(name: &str) -> &str {
    let name = name.trim();
    let simple = name.rsplit('.').next().unwrap_or(name);
    match simple.strip_suffix("Attribute") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => simple,
    }
}

pub(crate) fn qualify(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}.{}", ns, name),
        _ => name.to_string(),
    }
}

// =============================================================================
// Type references
// =============================================================================

/// A reference to a type as written in a declaration
///
/// Serialized as its C# spelling, e.g. `List<Course>?`, `Demo.Models.Address`,
/// `int[]`. A structured map form is also accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TypeRefRepr", into = "String")]
pub struct TypeRef {
    /// Simple name (`List`, `string`, `Address`)
    pub name: String,
    /// Namespace qualifier as written, if any
    pub namespace: Option<String>,
    /// Generic type arguments
    pub arguments: Vec<TypeRef>,
    /// `?` on the element type of an array (`int?[]`)
    pub element_nullable: bool,
    /// Number of `[]` suffixes
    pub array_rank: usize,
    /// Trailing `?`
    pub nullable: bool,
}

impl TypeRef {
    /// A plain named reference
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            arguments: Vec::new(),
            element_nullable: false,
            array_rank: 0,
            nullable: false,
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<TypeRef>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn is_array(&self) -> bool {
        self.array_rank > 0
    }

    /// The element reference of an array, or `self` for non-arrays
    pub fn element(&self) -> TypeRef {
        TypeRef {
            nullable: if self.is_array() {
                self.element_nullable
            } else {
                self.nullable
            },
            element_nullable: false,
            array_rank: 0,
            ..self.clone()
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{}.", ns)?;
        }
        write!(f, "{}", self.name)?;
        if !self.arguments.is_empty() {
            let args: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        if self.element_nullable {
            write!(f, "?")?;
        }
        for _ in 0..self.array_rank {
            write!(f, "[]")?;
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

impl From<TypeRef> for String {
    fn from(t: TypeRef) -> Self {
        t.to_string()
    }
}

impl FromStr for TypeRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = TypeRefParser {
            chars: s.chars().filter(|c| !c.is_whitespace()).collect(),
            pos: 0,
            source: s,
        };
        let parsed = parser.parse_type()?;
        if parser.pos != parser.chars.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(parsed)
    }
}

/// Input representation of a [`TypeRef`]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TypeRefRepr {
    /// C# spelling, e.g. `List<Course>?`
    Text(String),
    /// Structured form
    Structured {
        name: String,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        arguments: Vec<TypeRefRepr>,
        #[serde(default)]
        nullable: bool,
        #[serde(default)]
        array_rank: usize,
    },
}

impl TryFrom<TypeRefRepr> for TypeRef {
    type Error = Error;

    fn try_from(repr: TypeRefRepr) -> Result<Self> {
        match repr {
            TypeRefRepr::Text(text) => text.parse(),
            TypeRefRepr::Structured {
                name,
                namespace,
                arguments,
                nullable,
                array_rank,
            } => {
                if name.is_empty() {
                    return Err(Error::TypeRef("type name is empty".into()));
                }
                let arguments = arguments
                    .into_iter()
                    .map(TypeRef::try_from)
                    .collect::<Result<Vec<_>>>()?;
                Ok(TypeRef {
                    name,
                    namespace,
                    arguments,
                    element_nullable: false,
                    array_rank,
                    nullable,
                })
            }
        }
    }
}

struct TypeRefParser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl TypeRefParser<'_> {
    fn error(&self, msg: &str) -> Error {
        Error::TypeRef(format!("{} in '{}' at {}", msg, self.source, self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef> {
        // `global::` alias prefix carries no information here
        let rest: String = self.chars[self.pos..].iter().collect();
        if rest.starts_with("global::") {
            self.pos += "global::".len();
        }

        let mut segments = vec![self.parse_identifier()?];
        while self.eat('.') {
            segments.push(self.parse_identifier()?);
        }
        let name = segments.pop().ok_or_else(|| self.error("missing type name"))?;
        let namespace = if segments.is_empty() {
            None
        } else {
            Some(segments.join("."))
        };

        let mut arguments = Vec::new();
        if self.eat('<') {
            loop {
                arguments.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }

        let mut element_nullable = self.eat('?');
        let mut array_rank = 0;
        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.error("expected ']'"));
            }
            array_rank += 1;
        }

        let nullable = if array_rank == 0 {
            std::mem::take(&mut element_nullable)
        } else {
            self.eat('?')
        };

        Ok(TypeRef {
            name,
            namespace,
            arguments,
            element_nullable,
            array_rank,
            nullable,
        })
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '@' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.error("expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_type() {
        let t: TypeRef = "string".parse().unwrap();
        assert_eq!(t.name, "string");
        assert!(!t.nullable);
        assert!(t.arguments.is_empty());
    }

    #[test]
    fn test_parse_generic_nullable_type() {
        let t: TypeRef = "System.Collections.Generic.List<Course>?".parse().unwrap();
        assert_eq!(t.name, "List");
        assert_eq!(t.namespace.as_deref(), Some("System.Collections.Generic"));
        assert_eq!(t.arguments.len(), 1);
        assert_eq!(t.arguments[0].name, "Course");
        assert!(t.nullable);
    }

    #[test]
    fn test_parse_nested_generics() {
        let t: TypeRef = "Dictionary<string, List<int>>".parse().unwrap();
        assert_eq!(t.arguments.len(), 2);
        assert_eq!(t.arguments[1].arguments[0].name, "int");
        assert_eq!(t.to_string(), "Dictionary<string, List<int>>");
    }

    #[test]
    fn test_parse_arrays() {
        let t: TypeRef = "int?[]".parse().unwrap();
        assert_eq!(t.array_rank, 1);
        assert!(t.element_nullable);
        assert!(!t.nullable);
        assert_eq!(t.to_string(), "int?[]");
        assert!(t.element().nullable);

        let t: TypeRef = "global::Demo.Note[]?".parse().unwrap();
        assert_eq!(t.namespace.as_deref(), Some("Demo"));
        assert!(t.nullable);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("List<".parse::<TypeRef>().is_err());
        assert!("".parse::<TypeRef>().is_err());
        assert!("int]".parse::<TypeRef>().is_err());
    }

    #[test]
    fn test_normalize_attribute() {
        assert_eq!(normalize_attribute("AutoClassBuilderAttribute"), "AutoClassBuilder");
        assert_eq!(normalize_attribute("Attribute"), "Attribute");
        assert_eq!(normalize_attribute("My.Ns.Clone"), "Clone");
    }

    #[test]
    fn test_compilation_from_yaml_defaults() {
        let compilation = Compilation::from_yaml(
            r#"
types:
  - name: Person
    namespace: Demo
    attributes: [DeconstructAttribute]
    properties:
      - name: FirstName
        type: string?
      - name: Age
        type: int
        set: null
      - name: Id
        type: { name: Guid, namespace: System }
        set: { init: true }
"#,
        )
        .unwrap();

        let person = &compilation.types[0];
        assert_eq!(person.qualified_name(), "Demo.Person");
        assert!(person.has_attribute("Deconstruct"));
        assert_eq!(person.kind, DeclarationKind::Class);

        let first = &person.properties[0];
        assert_eq!(first.getter(), Some(Accessibility::Public));
        assert_eq!(first.setter(), Some(Accessibility::Public));

        assert_eq!(person.properties[1].setter(), None);
        assert!(person.properties[2].is_init_only());
        assert_eq!(person.properties[2].ty.to_string(), "System.Guid");
    }

    #[test]
    fn test_lookup_prefers_context_namespace() {
        let compilation = Compilation::from_yaml(
            r#"
types:
  - { name: Note, namespace: A }
  - { name: Note, namespace: B }
  - { name: Client, namespace: B.Inner }
"#,
        )
        .unwrap();

        let found = compilation.lookup(None, "Note", Some("B.Inner")).unwrap();
        assert_eq!(found.qualified_name(), "B.Note");
        // ambiguous without a context
        assert!(compilation.lookup(None, "Note", None).is_none());
        assert!(compilation.lookup(Some("A"), "Note", None).is_some());
    }

    #[test]
    fn test_json_schema_is_generated() {
        let schema = Compilation::json_schema().unwrap();
        assert!(schema.to_string().contains("TypeDeclaration"));
    }
}
