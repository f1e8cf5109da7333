//! Override detection: hand-written members that replace generation
//!
//! A strategy is suppressed when the compilation already contains a method
//! with the strategy's name, taking the target type as receiver (an extension
//! method with `this T` first, or an instance method declared on `T`) and one
//! `out` parameter per participating property. A strategy with no
//! participating properties is suppressed as well.

use crate::model::TypeModel;
use crate::schema::{Compilation, MethodDeclaration, ParameterModifier, TypeRef};
use serde::Serialize;

/// Outcome of the override gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Emit,
    Suppress(SuppressReason),
}

/// Why a request produced no artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SuppressReason {
    /// A hand-written method satisfies the contract
    HandWritten { method: String },
    NoEligibleProperties,
}

impl std::fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuppressReason::HandWritten { method } => write!(f, "hand-written {}", method),
            SuppressReason::NoEligibleProperties => write!(f, "no eligible properties"),
        }
    }
}

/// Decide whether a request should emit
pub fn gate(
    compilation: &Compilation,
    model: &TypeModel,
    method_name: &str,
    participants: usize,
) -> Gate {
    if participants == 0 {
        return Gate::Suppress(SuppressReason::NoEligibleProperties);
    }
    match find_override(compilation, model, method_name, participants) {
        Some(method) => Gate::Suppress(SuppressReason::HandWritten {
            method: describe(method),
        }),
        None => Gate::Emit,
    }
}

/// First hand-written method matching the expected shape
pub fn find_override<'c>(
    compilation: &'c Compilation,
    model: &TypeModel,
    method_name: &str,
    participants: usize,
) -> Option<&'c MethodDeclaration> {
    compilation
        .methods
        .iter()
        .filter(|m| m.name == method_name)
        .find(|m| {
            let outputs = if m.is_extension() {
                if !receiver_matches(&m.parameters[0].ty, model) {
                    return false;
                }
                &m.parameters[1..]
            } else if !m.is_static
                && m
                    .containing_type
                    .as_deref()
                    .is_some_and(|c| containing_matches(c, model))
            {
                &m.parameters[..]
            } else {
                return false;
            };
            outputs.len() == participants
                && outputs.iter().all(|p| p.modifier == ParameterModifier::Out)
        })
}

fn receiver_matches(receiver: &TypeRef, model: &TypeModel) -> bool {
    receiver.name == model.name
        && receiver
            .namespace
            .as_deref()
            .is_none_or(|ns| model.namespace.as_deref() == Some(ns))
}

fn containing_matches(containing: &str, model: &TypeModel) -> bool {
    // generic arity is not part of the comparison
    let name = containing.split('<').next().unwrap_or(containing).trim();
    match name.rsplit_once('.') {
        Some((ns, simple)) => simple == model.name && model.namespace.as_deref() == Some(ns),
        None => name == model.name,
    }
}

fn describe(method: &MethodDeclaration) -> String {
    match &method.containing_type {
        Some(owner) => format!("{}.{}", owner, method.name),
        None => method.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    fn setup(methods: &str) -> (Compilation, TypeModel) {
        let yaml = format!(
            r#"
types:
  - name: Person
    namespace: Demo
    attributes: [Deconstruct]
    properties:
      - {{ name: FirstName, type: string?, attributes: [IncludeInDeconstruct] }}
      - {{ name: LastName, type: string?, attributes: [IncludeInDeconstruct] }}
methods:
{}
"#,
            methods
        );
        let c = Compilation::from_yaml(&yaml).unwrap();
        let model = extract(&c, "Demo.Person").unwrap();
        (c, model)
    }

    #[test]
    fn test_extension_override_suppresses() {
        let (c, model) = setup(
            r#"
  - name: Deconstruct
    containing_type: Demo.PersonExtensions
    is_static: true
    parameters:
      - { name: person, type: Person, modifier: this }
      - { name: first, type: string?, modifier: out }
      - { name: last, type: string?, modifier: out }
"#,
        );
        assert!(matches!(
            gate(&c, &model, "Deconstruct", 2),
            Gate::Suppress(SuppressReason::HandWritten { .. })
        ));
    }

    #[test]
    fn test_instance_override_suppresses() {
        let (c, model) = setup(
            r#"
  - name: Deconstruct
    containing_type: Demo.Person
    parameters:
      - { name: first, type: string?, modifier: out }
      - { name: last, type: string?, modifier: out }
"#,
        );
        assert!(find_override(&c, &model, "Deconstruct", 2).is_some());
    }

    #[test]
    fn test_arity_mismatch_does_not_suppress() {
        let (c, model) = setup(
            r#"
  - name: Deconstruct
    is_static: true
    parameters:
      - { name: person, type: Demo.Person, modifier: this }
      - { name: first, type: string?, modifier: out }
"#,
        );
        assert_eq!(gate(&c, &model, "Deconstruct", 2), Gate::Emit);
    }

    #[test]
    fn test_other_receiver_does_not_suppress() {
        let (c, model) = setup(
            r#"
  - name: Deconstruct
    is_static: true
    parameters:
      - { name: person, type: Other.Person, modifier: this }
      - { name: first, type: string?, modifier: out }
      - { name: last, type: string?, modifier: out }
"#,
        );
        assert_eq!(gate(&c, &model, "Deconstruct", 2), Gate::Emit);
    }

    #[test]
    fn test_no_participants_suppresses() {
        let (c, model) = setup("  []");
        assert_eq!(
            gate(&c, &model, "Deconstruct", 0),
            Gate::Suppress(SuppressReason::NoEligibleProperties)
        );
    }
}
