//! Schema extraction: turn declarations into `TypeModel`s
//!
//! Walks a type and then each base type in turn, collecting per level the
//! public, non-static, non-indexer properties with a public getter, in
//! declaration order. Same-named properties found at several levels are all
//! kept; the strategies decide what to do with shadowed ones.

use crate::error::{Error, Result};
use crate::model::{ContainerInfo, Markers, PropertyModel, TypeFacts, TypeModel, TypeShape};
use crate::schema::{
    qualify, Accessibility, Compilation, DeclarationKind, Modifier, PropertyDeclaration,
    TypeDeclaration, TypeRef,
};
use crate::util::safe_class_name;
use std::collections::HashSet;
use tracing::debug;

/// C# keyword aliases for value types
const VALUE_KEYWORDS: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "nint",
    "nuint", "long", "ulong", "short", "ushort",
];

/// C# keyword aliases for reference types
const REFERENCE_KEYWORDS: &[&str] = &["object", "string", "dynamic"];

/// Well-known types: (simple name, namespace, is value type)
const WELL_KNOWN: &[(&str, &str, bool)] = &[
    ("Guid", "System", true),
    ("DateTime", "System", true),
    ("DateTimeOffset", "System", true),
    ("DateOnly", "System", true),
    ("TimeOnly", "System", true),
    ("TimeSpan", "System", true),
    ("Nullable", "System", true),
    ("String", "System", false),
    ("Object", "System", false),
    ("Uri", "System", false),
    ("Version", "System", false),
    ("Exception", "System", false),
    ("Action", "System", false),
    ("Func", "System", false),
    ("IComparable", "System", false),
    ("IEquatable", "System", false),
    ("IDisposable", "System", false),
    ("List", "System.Collections.Generic", false),
    ("IList", "System.Collections.Generic", false),
    ("ICollection", "System.Collections.Generic", false),
    ("IEnumerable", "System.Collections.Generic", false),
    ("IReadOnlyList", "System.Collections.Generic", false),
    ("IReadOnlyCollection", "System.Collections.Generic", false),
    ("HashSet", "System.Collections.Generic", false),
    ("ISet", "System.Collections.Generic", false),
    ("SortedSet", "System.Collections.Generic", false),
    ("LinkedList", "System.Collections.Generic", false),
    ("Queue", "System.Collections.Generic", false),
    ("Stack", "System.Collections.Generic", false),
    ("Dictionary", "System.Collections.Generic", false),
    ("IDictionary", "System.Collections.Generic", false),
    ("IReadOnlyDictionary", "System.Collections.Generic", false),
    ("Collection", "System.Collections.ObjectModel", false),
    ("ObservableCollection", "System.Collections.ObjectModel", false),
    ("ReadOnlyCollection", "System.Collections.ObjectModel", false),
];

/// Constraint keywords that must come first in a `where` clause
const SPECIAL_CONSTRAINTS: &[&str] = &["unmanaged", "notnull", "class", "class?", "struct", "default"];

/// Extract the model for the type with this qualified name
pub fn extract(compilation: &Compilation, qualified_name: &str) -> Result<TypeModel> {
    Extractor::new(compilation).extract(qualified_name)
}

/// Builds `TypeModel`s against one compilation
pub struct Extractor<'c> {
    compilation: &'c Compilation,
}

/// A resolved type reference
struct Resolved<'c> {
    display: String,
    is_value_type: bool,
    declaration: Option<&'c TypeDeclaration>,
}

impl<'c> Extractor<'c> {
    pub fn new(compilation: &'c Compilation) -> Self {
        Self { compilation }
    }

    /// Extract a type and its ancestor chain
    pub fn extract(&self, qualified_name: &str) -> Result<TypeModel> {
        let parts = self.compilation.parts_of(qualified_name);
        let first = *parts
            .first()
            .ok_or_else(|| Error::UnknownType(qualified_name.to_string()))?;

        let generic_parameters: Vec<String> = first
            .generic_parameters
            .iter()
            .map(|g| g.name.clone())
            .collect();
        let constraints = self.render_constraints(first);

        let mut properties = Vec::new();
        let mut visited = HashSet::new();
        let mut level: Vec<&TypeDeclaration> = parts.clone();
        let mut depth = 0;

        loop {
            let level_name = level[0].qualified_name();
            if !visited.insert(level_name.clone()) {
                return Err(Error::Extraction(format!(
                    "inheritance cycle through '{}' while extracting '{}'",
                    level_name, qualified_name
                )));
            }

            let scope: Vec<&str> = level[0]
                .generic_parameters
                .iter()
                .map(|g| g.name.as_str())
                .collect();
            for part in &level {
                for property in part.properties.iter().filter(|p| is_extractable(p)) {
                    properties.push(self.property_model(property, part, depth, &scope));
                }
            }

            let base = level.iter().find_map(|p| p.base_type.as_ref());
            let Some(base) = base else { break };
            let Some(base_decl) =
                self.compilation
                    .lookup(base.namespace.as_deref(), &base.name, level[0].namespace.as_deref())
            else {
                debug!(type_name = %level_name, base = %base, "base type outside compilation, ending walk");
                break;
            };
            if base_decl.kind == DeclarationKind::Interface {
                break;
            }
            level = self.compilation.parts_of(&base_decl.qualified_name());
            depth += 1;
        }

        let is_partial = parts.iter().any(|p| p.has_modifier(Modifier::Partial));
        let shape = if first.kind.is_value_type() {
            TypeShape::Value
        } else {
            TypeShape::Reference
        };

        debug!(
            type_name = %qualified_name,
            properties = properties.len(),
            levels = depth + 1,
            "extracted type"
        );

        Ok(TypeModel {
            name: first.name.clone(),
            namespace: first.namespace.clone().filter(|ns| !ns.is_empty()),
            fully_qualified_name: format!("global::{}", qualified_name),
            generic_parameters,
            constraints,
            shape,
            accessibility: first.accessibility,
            is_partial,
            is_record: matches!(
                first.kind,
                DeclarationKind::Record | DeclarationKind::RecordStruct
            ),
            properties,
        })
    }

    fn property_model(
        &self,
        property: &PropertyDeclaration,
        declaring: &TypeDeclaration,
        depth: usize,
        scope: &[&str],
    ) -> PropertyModel {
        let context = declaring.namespace.as_deref();
        let resolved = self.resolve(&property.ty, context, scope);

        let nested_builder = resolved
            .declaration
            .filter(|d| !property.ty.is_array() && is_builder_target(d))
            .map(|d| {
                let arguments: Vec<String> = property
                    .ty
                    .arguments
                    .iter()
                    .map(|a| self.resolve(a, context, scope).display)
                    .collect();
                let suffix = if arguments.is_empty() {
                    String::new()
                } else {
                    format!("<{}>", arguments.join(", "))
                };
                format!(
                    "global::{}{}",
                    qualify(d.namespace.as_deref(), &format!("{}Builder", safe_class_name(&d.name))),
                    suffix
                )
            });

        let container = if !property.ty.is_array() && property.ty.arguments.len() == 1 {
            let argument = self.resolve(&property.ty.arguments[0], context, scope);
            Some(ContainerInfo {
                container: property.ty.name.clone(),
                element: argument.display,
                element_cloneable: argument.declaration.is_some_and(is_cloneable_class),
            })
        } else {
            None
        };

        PropertyModel {
            name: property.name.clone(),
            depth,
            declaring_type: declaring.qualified_name(),
            type_name: resolved.display,
            getter: property.getter(),
            setter: property.setter(),
            init_only: property.is_init_only(),
            markers: markers_of(property),
            facts: TypeFacts {
                is_value_type: resolved.is_value_type && !property.ty.is_array(),
                nullable: property.ty.nullable,
                declared_in_compilation: resolved.declaration.map(|d| d.qualified_name()),
                nested_builder,
                container,
            },
        }
    }

    /// Resolve a reference to its fully-qualified display
    fn resolve(&self, ty: &TypeRef, context: Option<&str>, scope: &[&str]) -> Resolved<'c> {
        let arguments: Vec<String> = ty
            .arguments
            .iter()
            .map(|a| self.resolve(a, context, scope).display)
            .collect();

        let mut declaration = None;
        let (base, is_value_type) = if ty.namespace.is_none() && scope.contains(&ty.name.as_str()) {
            (ty.name.clone(), false)
        } else if ty.namespace.is_none() && VALUE_KEYWORDS.contains(&ty.name.as_str()) {
            (ty.name.clone(), true)
        } else if ty.namespace.is_none() && REFERENCE_KEYWORDS.contains(&ty.name.as_str()) {
            (ty.name.clone(), false)
        } else if let Some(decl) =
            self.compilation
                .lookup(ty.namespace.as_deref(), &ty.name, context)
        {
            declaration = Some(decl);
            (format!("global::{}", decl.qualified_name()), decl.kind.is_value_type())
        } else if let Some((name, ns, value)) = WELL_KNOWN.iter().find(|(name, ns, _)| {
            *name == ty.name && ty.namespace.as_deref().is_none_or(|written| written == *ns)
        }) {
            (format!("global::{}.{}", ns, name), *value)
        } else {
            let written = qualify(ty.namespace.as_deref(), &ty.name);
            match ty.namespace {
                Some(_) => (format!("global::{}", written), false),
                None => (written, false),
            }
        };

        let mut display = base;
        if !arguments.is_empty() {
            display.push_str(&format!("<{}>", arguments.join(", ")));
        }
        if ty.element_nullable {
            display.push('?');
        }
        for _ in 0..ty.array_rank {
            display.push_str("[]");
        }
        if ty.nullable {
            display.push('?');
        }

        Resolved {
            display,
            is_value_type,
            declaration,
        }
    }

    /// `where T : …` clauses in declaration order of the parameters
    fn render_constraints(&self, declaration: &TypeDeclaration) -> Vec<String> {
        let scope: Vec<&str> = declaration
            .generic_parameters
            .iter()
            .map(|g| g.name.as_str())
            .collect();

        declaration
            .generic_parameters
            .iter()
            .filter(|g| !g.constraints.is_empty())
            .map(|g| {
                let mut special = Vec::new();
                let mut types = Vec::new();
                let mut constructor = false;
                for constraint in &g.constraints {
                    let constraint = constraint.trim();
                    if constraint == "new()" {
                        constructor = true;
                    } else if SPECIAL_CONSTRAINTS.contains(&constraint) {
                        special.push(constraint.to_string());
                    } else {
                        let display = constraint
                            .parse::<TypeRef>()
                            .map(|t| {
                                self.resolve(&t, declaration.namespace.as_deref(), &scope)
                                    .display
                            })
                            .unwrap_or_else(|_| constraint.to_string());
                        types.push(display);
                    }
                }
                if constructor {
                    types.push("new()".to_string());
                }
                special.extend(types);
                format!("where {} : {}", g.name, special.join(", "))
            })
            .collect()
    }
}

fn is_extractable(property: &PropertyDeclaration) -> bool {
    !property.is_static && !property.is_indexer && property.getter() == Some(Accessibility::Public)
}

fn markers_of(property: &PropertyDeclaration) -> Markers {
    Markers {
        exclude: property.has_attribute("Exclude"),
        skip_builder: property.has_attribute("SkipClassBuilder"),
        skip_clone: property.has_attribute("SkipCloneable"),
        skip_fluent: property.has_attribute("SkipFluentClass"),
        include_in_deconstruct: property.has_attribute("IncludeInDeconstruct"),
        deep_clone: property.has_attribute("Clone") || property.has_attribute("DeepClone"),
    }
}

fn is_system_namespace(namespace: Option<&str>) -> bool {
    namespace.is_some_and(|ns| ns == "System" || ns.starts_with("System."))
}

/// User-defined class carrying the builder marker
fn is_builder_target(declaration: &TypeDeclaration) -> bool {
    declaration.kind.is_class()
        && !is_system_namespace(declaration.namespace.as_deref())
        && declaration.has_attribute(crate::model::Strategy::Builder.marker())
}

/// Reference type that can be cloned element-wise on its own
pub fn is_cloneable_class(declaration: &TypeDeclaration) -> bool {
    declaration.kind.is_class()
        && !declaration.has_modifier(Modifier::Abstract)
        && !declaration.has_modifier(Modifier::Sealed)
        && !declaration.has_modifier(Modifier::Static)
        && !is_system_namespace(declaration.namespace.as_deref())
        && !declaration.name.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compilation(yaml: &str) -> Compilation {
        Compilation::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_extracts_inheritance_chain_in_order() {
        let c = compilation(
            r#"
types:
  - name: Employee
    namespace: Hr
    base_type: Person
    properties:
      - { name: Salary, type: decimal }
      - { name: Name, type: string? }
  - name: Person
    namespace: Hr
    properties:
      - { name: Name, type: string? }
      - { name: Secret, type: string, get: { accessibility: private } }
      - { name: Count, type: int, is_static: true }
"#,
        );

        let model = extract(&c, "Hr.Employee").unwrap();
        let names: Vec<(&str, usize)> = model
            .properties
            .iter()
            .map(|p| (p.name.as_str(), p.depth))
            .collect();
        assert_eq!(names, vec![("Salary", 0), ("Name", 0), ("Name", 1)]);
        assert_eq!(model.fully_qualified_name, "global::Hr.Employee");
        assert_eq!(model.properties[2].declaring_type, "Hr.Person");
    }

    #[test]
    fn test_partial_parts_are_merged() {
        let c = compilation(
            r#"
types:
  - name: Course
    namespace: School
    modifiers: [partial]
    properties:
      - { name: CourseId, type: int }
  - name: Course
    namespace: School
    attributes: [Cloneable]
    properties:
      - { name: CourseName, type: string? }
"#,
        );

        let model = extract(&c, "School.Course").unwrap();
        assert!(model.is_partial);
        assert_eq!(model.properties.len(), 2);
        assert!(model.properties[0].facts.is_value_type);
        assert_eq!(model.properties[1].type_name, "string?");
    }

    #[test]
    fn test_inheritance_cycle_is_an_error() {
        let c = compilation(
            r#"
types:
  - { name: A, base_type: B }
  - { name: B, base_type: A }
"#,
        );
        assert!(matches!(extract(&c, "A"), Err(Error::Extraction(_))));
        assert!(matches!(extract(&c, "Missing"), Err(Error::UnknownType(_))));
    }

    #[test]
    fn test_resolves_types_and_facts() {
        let c = compilation(
            r#"
types:
  - name: Client
    namespace: Crm
    attributes: [AutoClassBuilder]
    properties:
      - { name: Id, type: Guid }
      - { name: Address, type: Address? }
      - { name: Notes, type: List<Note>?, attributes: [DeepClone] }
      - { name: Tags, type: "string[]" }
  - name: Address
    namespace: Crm
    attributes: [AutoClassBuilderAttribute]
  - name: Note
    namespace: Crm
    modifiers: [partial]
"#,
        );

        let model = extract(&c, "Crm.Client").unwrap();
        let props = &model.properties;

        assert_eq!(props[0].type_name, "global::System.Guid");
        assert!(props[0].facts.is_value_type);

        assert_eq!(props[1].type_name, "global::Crm.Address?");
        assert_eq!(
            props[1].facts.nested_builder.as_deref(),
            Some("global::Crm.AddressBuilder")
        );

        assert_eq!(
            props[2].type_name,
            "global::System.Collections.Generic.List<global::Crm.Note>?"
        );
        assert!(props[2].markers.deep_clone);
        let container = props[2].facts.container.as_ref().unwrap();
        assert_eq!(container.container, "List");
        assert!(container.element_cloneable);

        assert_eq!(props[3].type_name, "string[]");
        assert!(props[3].facts.container.is_none());
    }

    #[test]
    fn test_constraints_are_ordered() {
        let c = compilation(
            r#"
types:
  - name: Repository
    namespace: Data
    generic_parameters:
      - { name: T, constraints: ["new()", "IComparable<T>", class] }
      - { name: U }
"#,
        );

        let model = extract(&c, "Data.Repository").unwrap();
        assert_eq!(model.generic_parameters, vec!["T", "U"]);
        assert_eq!(
            model.constraints,
            vec!["where T : class, global::System.IComparable<T>, new()"]
        );
    }

    #[test]
    fn test_sealed_element_is_not_cloneable() {
        let c = compilation(
            r#"
types:
  - name: Holder
    properties:
      - { name: Items, type: List<Item>, attributes: [Clone] }
  - { name: Item, modifiers: [sealed] }
"#,
        );
        let model = extract(&c, "Holder").unwrap();
        let container = model.properties[0].facts.container.as_ref().unwrap();
        assert!(!container.element_cloneable);
    }

    #[test]
    fn test_nested_builder_of_generic_type_carries_arguments() {
        let c = compilation(
            r#"
types:
  - name: Order
    namespace: Shop
    attributes: [AutoClassBuilder]
    properties:
      - { name: Total, type: Wrapper<decimal>? }
      - { name: Owner, type: Wrapper<Customer> }
  - name: Wrapper
    namespace: Shop
    attributes: [AutoClassBuilder]
    generic_parameters: [{ name: T }]
    properties:
      - { name: Value, type: T }
  - name: Customer
    namespace: Shop
"#,
        );

        let model = extract(&c, "Shop.Order").unwrap();
        assert_eq!(
            model.properties[0].facts.nested_builder.as_deref(),
            Some("global::Shop.WrapperBuilder<decimal>")
        );
        assert_eq!(
            model.properties[1].facts.nested_builder.as_deref(),
            Some("global::Shop.WrapperBuilder<global::Shop.Customer>")
        );
    }
}
