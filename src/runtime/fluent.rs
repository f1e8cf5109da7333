//! Fluent Mutator runtime: in-place setters and an optional validation rule

use super::heap::{Heap, ObjectId, Value};
use super::{Predicate, TypeRegistry};
use crate::eligibility::eligible;
use crate::error::{Error, Result};
use crate::model::{Strategy, TypeModel};
use std::fmt;

/// An instance constructed through the fluent constructor
pub struct FluentObject<'r> {
    model: &'r TypeModel,
    id: ObjectId,
    rule: Option<Predicate>,
}

impl fmt::Debug for FluentObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentObject")
            .field("type_name", &self.model.name)
            .field("id", &self.id)
            .field("has_rule", &self.rule.is_some())
            .finish()
    }
}

impl<'r> FluentObject<'r> {
    pub fn new(
        registry: &'r TypeRegistry,
        heap: &mut Heap,
        type_name: &str,
        rule: Option<Predicate>,
    ) -> Result<Self> {
        let model = registry.model(type_name)?;
        let id = heap.alloc(model.qualified_name());
        Ok(Self { model, id, rule })
    }

    /// `With<Prop>(value)`: mutates this instance and returns it
    pub fn with(&mut self, heap: &mut Heap, property: &str, value: Value) -> Result<&mut Self> {
        let known = eligible(self.model, Strategy::Fluent)
            .iter()
            .any(|p| p.name == property);
        if !known {
            return Err(Error::UnknownProperty {
                type_name: self.model.name.clone(),
                property: property.to_string(),
            });
        }
        heap.set(self.id, property, value)?;
        Ok(self)
    }

    /// True when no rule was given
    pub fn validate(&self, heap: &Heap) -> bool {
        self.rule.as_ref().map_or(true, |rule| rule(heap, self.id))
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Compilation;

    const LOG: &str = r#"
types:
  - name: JsonLog
    namespace: Logs
    modifiers: [partial]
    attributes: [FluentClass]
    properties:
      - { name: Message, type: string? }
      - { name: Level, type: int }
      - { name: CorrelationId, type: Guid, set: { init: true } }
"#;

    fn registry() -> TypeRegistry {
        TypeRegistry::from_compilation(&Compilation::from_yaml(LOG).unwrap()).unwrap()
    }

    #[test]
    fn test_setters_mutate_in_place() {
        let registry = registry();
        let mut heap = Heap::new();
        let mut log = FluentObject::new(&registry, &mut heap, "JsonLog", None).unwrap();
        let before = heap.len();
        log.with(&mut heap, "Message", "started".into())
            .unwrap()
            .with(&mut heap, "Level", Value::Int(2))
            .unwrap();
        assert_eq!(heap.len(), before);
        assert_eq!(heap.get(log.id(), "Level").unwrap(), Value::Int(2));
        assert!(log.validate(&heap));
    }

    #[test]
    fn test_init_only_property_has_no_setter() {
        let registry = registry();
        let mut heap = Heap::new();
        let mut log = FluentObject::new(&registry, &mut heap, "JsonLog", None).unwrap();
        assert!(log.with(&mut heap, "CorrelationId", "x".into()).is_err());
    }

    #[test]
    fn test_validate_runs_rule() {
        let registry = registry();
        let mut heap = Heap::new();
        let rule: Predicate = Box::new(|heap: &Heap, id: ObjectId| {
            matches!(heap.get(id, "Level"), Ok(Value::Int(level)) if level > 0)
        });
        let mut log = FluentObject::new(&registry, &mut heap, "JsonLog", Some(rule)).unwrap();
        assert!(!log.validate(&heap));
        log.with(&mut heap, "Level", Value::Int(1)).unwrap();
        assert!(log.validate(&heap));
    }
}
