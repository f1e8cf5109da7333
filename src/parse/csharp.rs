//! C# declaration reader

use crate::error::Result;
use crate::schema::{
    Accessibility, AccessorDeclaration, Compilation, DeclarationKind, GenericParameter,
    MethodDeclaration, Modifier, ParameterDeclaration, ParameterModifier, PropertyDeclaration,
    TypeDeclaration, TypeRef,
};
use tracing::debug;
use tree_sitter::Node;

use super::{parse_tree, text};

/// Read every top-level type and its members from C# source
///
/// Nested type declarations are skipped.
pub fn parse_csharp(source: &str) -> Result<Compilation> {
    let tree = parse_tree(source)?;
    let mut compilation = Compilation::default();
    let mut reader = Reader {
        source,
        compilation: &mut compilation,
    };
    reader.visit_members(tree.root_node(), None);
    Ok(compilation)
}

struct Reader<'s, 'c> {
    source: &'s str,
    compilation: &'c mut Compilation,
}

impl Reader<'_, '_> {
    fn text(&self, node: Node) -> &str {
        text(node, self.source)
    }

    /// Visit namespace and type members in order
    fn visit_members(&mut self, parent: Node, namespace: Option<String>) {
        let mut namespace = namespace;
        let mut cursor = parent.walk();
        for child in parent.named_children(&mut cursor) {
            match child.kind() {
                "namespace_declaration" => {
                    let nested = self.namespace_name(child, namespace.as_deref());
                    if let Some(body) = child.child_by_field_name("body") {
                        self.visit_members(body, nested);
                    }
                }
                "file_scoped_namespace_declaration" => {
                    // applies to the following siblings
                    namespace = self.namespace_name(child, namespace.as_deref());
                    self.visit_members(child, namespace.clone());
                }
                "class_declaration" | "record_declaration" | "struct_declaration"
                | "record_struct_declaration" | "interface_declaration" => {
                    self.visit_type(child, namespace.clone());
                }
                "declaration_list" => self.visit_members(child, namespace.clone()),
                _ => {}
            }
        }
    }

    fn namespace_name(&self, node: Node, outer: Option<&str>) -> Option<String> {
        let name = node.child_by_field_name("name").map(|n| self.text(n).to_string())?;
        Some(match outer {
            Some(outer) => format!("{}.{}", outer, name),
            None => name,
        })
    }

    fn visit_type(&mut self, node: Node, namespace: Option<String>) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.text(n).to_string()) else {
            return;
        };

        let mut declaration = TypeDeclaration {
            name,
            namespace,
            kind: self.kind_of(node),
            ..Default::default()
        };
        let (accessibility, modifiers) = self.modifiers(node, Accessibility::Internal);
        declaration.accessibility = accessibility;
        declaration.modifiers = modifiers;

        let mut body = None;
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "attribute_list" => declaration.attributes.extend(self.attributes(child)),
                "type_parameter_list" => {
                    let mut params = child.walk();
                    for parameter in child.named_children(&mut params) {
                        if parameter.kind() == "type_parameter" {
                            let name = parameter
                                .child_by_field_name("name")
                                .unwrap_or(parameter);
                            declaration.generic_parameters.push(GenericParameter {
                                name: self.text(name).trim().to_string(),
                                constraints: Vec::new(),
                            });
                        }
                    }
                }
                "type_parameter_constraints_clause" => self.constraints(child, &mut declaration),
                "base_list" => declaration.base_type = self.base_type(child),
                "declaration_list" => body = Some(child),
                _ => {}
            }
        }

        let qualified = declaration.qualified_name();
        let member_default = if declaration.kind == DeclarationKind::Interface {
            Accessibility::Public
        } else {
            Accessibility::Private
        };

        if let Some(body) = body {
            let mut members = body.walk();
            for member in body.named_children(&mut members) {
                match member.kind() {
                    "property_declaration" => {
                        if let Some(property) = self.property(member, member_default) {
                            declaration.properties.push(property);
                        }
                    }
                    "method_declaration" => {
                        if let Some(method) = self.method(member, &qualified) {
                            self.compilation.methods.push(method);
                        }
                    }
                    kind if kind.ends_with("_declaration") && kind != "field_declaration" => {
                        debug!(kind, type_name = %qualified, "skipping member declaration");
                    }
                    _ => {}
                }
            }
        }

        self.compilation.types.push(declaration);
    }

    fn kind_of(&self, node: Node) -> DeclarationKind {
        match node.kind() {
            "struct_declaration" => DeclarationKind::Struct,
            "interface_declaration" => DeclarationKind::Interface,
            "record_struct_declaration" => DeclarationKind::RecordStruct,
            "record_declaration" => {
                let mut cursor = node.walk();
                let is_struct = node.children(&mut cursor).any(|c| c.kind() == "struct");
                if is_struct {
                    DeclarationKind::RecordStruct
                } else {
                    DeclarationKind::Record
                }
            }
            _ => DeclarationKind::Class,
        }
    }

    /// Accessibility and structural modifiers from `modifier` children
    fn modifiers(&self, node: Node, default: Accessibility) -> (Accessibility, Vec<Modifier>) {
        let mut words = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "modifier" {
                words.push(self.text(child).trim().to_string());
            }
        }
        let modifiers = words
            .iter()
            .filter_map(|w| match w.as_str() {
                "partial" => Some(Modifier::Partial),
                "abstract" => Some(Modifier::Abstract),
                "sealed" => Some(Modifier::Sealed),
                "static" => Some(Modifier::Static),
                "readonly" => Some(Modifier::Readonly),
                _ => None,
            })
            .collect();
        (accessibility_of(&words).unwrap_or(default), modifiers)
    }

    fn attributes(&self, list: Node) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = list.walk();
        for attribute in list.named_children(&mut cursor) {
            if attribute.kind() == "attribute" {
                if let Some(name) = attribute.child_by_field_name("name") {
                    names.push(self.text(name).to_string());
                }
            }
        }
        names
    }

    fn constraints(&self, clause: Node, declaration: &mut TypeDeclaration) {
        let mut target = None;
        let mut constraints = Vec::new();
        let mut cursor = clause.walk();
        for child in clause.named_children(&mut cursor) {
            match child.kind() {
                "identifier" if target.is_none() => target = Some(self.text(child).to_string()),
                "type_parameter_constraint" => constraints.push(compact(self.text(child))),
                _ => {}
            }
        }
        if let Some(parameter) = target.and_then(|t| {
            declaration
                .generic_parameters
                .iter_mut()
                .find(|g| g.name == t)
        }) {
            parameter.constraints = constraints;
        }
    }

    /// First base that does not look like an interface (`IName`)
    fn base_type(&self, list: Node) -> Option<TypeRef> {
        let mut cursor = list.walk();
        let bases: Vec<Node> = list.named_children(&mut cursor).collect();
        bases.into_iter().find_map(|base| {
            let base = if base.kind() == "primary_constructor_base_type" {
                base.named_child(0)?
            } else {
                base
            };
            let parsed = type_ref(self.text(base));
            let mut chars = parsed.name.chars();
            let interface_like = chars.next() == Some('I')
                && chars.next().is_some_and(|c| c.is_ascii_uppercase());
            (!interface_like).then_some(parsed)
        })
    }

    fn property(&self, node: Node, default: Accessibility) -> Option<PropertyDeclaration> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let ty = type_ref(self.text(node.child_by_field_name("type")?));
        let (accessibility, modifiers) = self.modifiers(node, default);

        let mut property = PropertyDeclaration::new(name, ty);
        property.accessibility = accessibility;
        property.is_static = modifiers.contains(&Modifier::Static);

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "attribute_list" {
                property.attributes.extend(self.attributes(child));
            }
        }

        match node.child_by_field_name("accessors") {
            Some(accessors) => {
                property.get = None;
                property.set = None;
                let mut list = accessors.walk();
                for accessor in accessors.named_children(&mut list) {
                    if accessor.kind() != "accessor_declaration" {
                        continue;
                    }
                    let mut words = Vec::new();
                    let mut keyword = None;
                    let mut parts = accessor.walk();
                    for part in accessor.children(&mut parts) {
                        match part.kind() {
                            "modifier" => words.push(self.text(part).trim().to_string()),
                            "get" | "set" | "init" => keyword = Some(part.kind()),
                            _ => {}
                        }
                    }
                    let declared = AccessorDeclaration {
                        accessibility: accessibility_of(&words),
                        init: keyword == Some("init"),
                    };
                    match keyword {
                        Some("get") => property.get = Some(declared),
                        Some("set") | Some("init") => property.set = Some(declared),
                        _ => {}
                    }
                }
            }
            // expression-bodied: get only
            None => property.set = None,
        }

        Some(property)
    }

    fn method(&self, node: Node, containing: &str) -> Option<MethodDeclaration> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let (_, modifiers) = self.modifiers(node, Accessibility::Private);

        let mut parameters = Vec::new();
        if let Some(list) = node.child_by_field_name("parameters") {
            let mut cursor = list.walk();
            for parameter in list.named_children(&mut cursor) {
                if parameter.kind() != "parameter" {
                    continue;
                }
                let Some(name) = parameter.child_by_field_name("name") else {
                    continue;
                };
                let ty = parameter
                    .child_by_field_name("type")
                    .map(|t| type_ref(self.text(t)))
                    .unwrap_or_else(|| TypeRef::named("object"));

                let mut modifier = ParameterModifier::None;
                let mut parts = parameter.walk();
                for part in parameter.children(&mut parts) {
                    let word = match part.kind() {
                        "modifier" | "parameter_modifier" => self.text(part).trim(),
                        other => other,
                    };
                    modifier = match word {
                        "this" => ParameterModifier::This,
                        "out" => ParameterModifier::Out,
                        "ref" => ParameterModifier::Ref,
                        "in" => ParameterModifier::In,
                        _ => continue,
                    };
                }

                parameters.push(ParameterDeclaration {
                    name: self.text(name).to_string(),
                    ty,
                    modifier,
                });
            }
        }

        Some(MethodDeclaration {
            name,
            containing_type: Some(containing.to_string()),
            is_static: modifiers.contains(&Modifier::Static),
            parameters,
        })
    }
}

fn accessibility_of(words: &[String]) -> Option<Accessibility> {
    let has = |w: &str| words.iter().any(|x| x == w);
    match (has("public"), has("internal"), has("protected"), has("private")) {
        (true, _, _, _) => Some(Accessibility::Public),
        (_, true, true, _) => Some(Accessibility::ProtectedInternal),
        (_, _, true, true) => Some(Accessibility::PrivateProtected),
        (_, true, _, _) => Some(Accessibility::Internal),
        (_, _, true, _) => Some(Accessibility::Protected),
        (_, _, _, true) => Some(Accessibility::Private),
        _ => None,
    }
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse type text, keeping unsupported forms (tuples, pointers) verbatim
fn type_ref(text: &str) -> TypeRef {
    text.parse().unwrap_or_else(|_| {
        debug!(type_text = text, "unsupported type syntax, keeping verbatim");
        TypeRef::named(compact(text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STUDENT: &str = r#"
using System.Collections.Generic;
using ArxRiver.SourceGenerator.Attributes;

namespace School.Models;

[Cloneable]
internal partial class Student : Person, IComparable<Student>
{
    public Student() { }

    public string? Name { get; set; }
    public int Age { get; private set; }
    public Guid Id { get; init; }
    public int Computed => Age * 2;
    private string Secret { get; set; }
    public static int Count { get; set; }

    [DeepClone]
    public List<Course>? Courses { get; set; }
}

public class Person
{
    [IncludeInDeconstruct]
    public string? FirstName { get; set; }
}
"#;

    #[test]
    fn test_reads_type_declaration() {
        let c = parse_csharp(STUDENT).unwrap();
        assert_eq!(c.types.len(), 2);

        let student = &c.types[0];
        assert_eq!(student.qualified_name(), "School.Models.Student");
        assert_eq!(student.accessibility, Accessibility::Internal);
        assert!(student.has_modifier(Modifier::Partial));
        assert!(student.has_attribute("Cloneable"));
        assert_eq!(student.base_type.as_ref().map(|b| b.name.as_str()), Some("Person"));
    }

    #[test]
    fn test_reads_property_accessors() {
        let c = parse_csharp(STUDENT).unwrap();
        let props = &c.types[0].properties;
        let names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Name", "Age", "Id", "Computed", "Secret", "Count", "Courses"]
        );

        assert_eq!(props[0].setter(), Some(Accessibility::Public));
        assert_eq!(props[1].setter(), Some(Accessibility::Private));
        assert!(props[2].is_init_only());
        assert_eq!(props[3].setter(), None);
        assert_eq!(props[4].getter(), Some(Accessibility::Private));
        assert!(props[5].is_static);
        assert_eq!(props[6].ty.to_string(), "List<Course>?");
        assert!(props[6].has_attribute("DeepClone"));
    }

    #[test]
    fn test_reads_generics_and_constraints() {
        let c = parse_csharp(
            r#"
namespace Data
{
    public class Repository<T, U> where T : class, new()
    {
        public T? Item { get; set; }
    }
}
"#,
        )
        .unwrap();
        let repo = &c.types[0];
        assert_eq!(repo.namespace.as_deref(), Some("Data"));
        assert_eq!(repo.generic_parameters.len(), 2);
        assert_eq!(repo.generic_parameters[0].constraints, vec!["class", "new()"]);
        assert!(repo.generic_parameters[1].constraints.is_empty());
    }

    #[test]
    fn test_reads_method_signatures() {
        let c = parse_csharp(
            r#"
namespace Demo;

public static class PersonExtensions
{
    public static void Deconstruct(this Person person, out string? first, out string? last)
    {
        first = person.FirstName;
        last = person.LastName;
    }
}
"#,
        )
        .unwrap();
        let method = &c.methods[0];
        assert_eq!(method.name, "Deconstruct");
        assert_eq!(method.containing_type.as_deref(), Some("Demo.PersonExtensions"));
        assert!(method.is_extension());
        let modifiers: Vec<ParameterModifier> =
            method.parameters.iter().map(|p| p.modifier).collect();
        assert_eq!(
            modifiers,
            vec![
                ParameterModifier::This,
                ParameterModifier::Out,
                ParameterModifier::Out
            ]
        );
    }

    #[test]
    fn test_accessibility_of_combinations() {
        let words = |ws: &[&str]| ws.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        assert_eq!(
            accessibility_of(&words(&["protected", "internal"])),
            Some(Accessibility::ProtectedInternal)
        );
        assert_eq!(
            accessibility_of(&words(&["private", "protected"])),
            Some(Accessibility::PrivateProtected)
        );
        assert_eq!(accessibility_of(&words(&["static"])), None);
    }
}
