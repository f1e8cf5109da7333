//! Class Builder runtime
//!
//! A builder owns a draft instance on the heap. Nested builders are created
//! on first use of [`Builder::with_nested`] and built into the draft by
//! [`Builder::build`] before validation runs.

use super::heap::{Heap, ObjectId, Value};
use super::{Predicate, TypeRegistry};
use crate::error::{Error, Result};
use crate::model::{PropertyModel, Strategy, TypeModel};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

pub struct Builder<'r> {
    registry: &'r TypeRegistry,
    model: &'r TypeModel,
    draft: ObjectId,
    nested: BTreeMap<String, Builder<'r>>,
    rule: Option<Predicate>,
}

impl fmt::Debug for Builder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("type_name", &self.model.name)
            .field("draft", &self.draft)
            .field("nested", &self.nested)
            .field("has_rule", &self.rule.is_some())
            .finish()
    }
}

impl<'r> Builder<'r> {
    /// `Create()`: a builder over a fresh draft of `type_name`
    pub fn create(registry: &'r TypeRegistry, heap: &mut Heap, type_name: &str) -> Result<Self> {
        let model = registry.model(type_name)?;
        let draft = heap.alloc(model.qualified_name());
        Ok(Self {
            registry,
            model,
            draft,
            nested: BTreeMap::new(),
            rule: None,
        })
    }

    pub fn with_validation_rule(&mut self, rule: Predicate) -> &mut Self {
        self.rule = Some(rule);
        self
    }

    /// `With<Prop>(value)`; only builder-eligible properties can be set
    pub fn with(&mut self, heap: &mut Heap, property: &str, value: Value) -> Result<&mut Self> {
        let property = self.participant(property)?;
        heap.set(self.draft, &property.name, value)?;
        Ok(self)
    }

    /// `With<Prop>(Action<NestedBuilder>)`
    ///
    /// The nested builder is created the first time and reused afterwards, so
    /// repeated calls accumulate into one nested draft.
    pub fn with_nested<F>(&mut self, heap: &mut Heap, property: &str, configure: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Heap, &mut Builder<'r>) -> Result<()>,
    {
        let participant = self.participant(property)?;
        let nested_type = match (
            participant.facts.nested_builder.as_ref(),
            participant.facts.declared_in_compilation.as_deref(),
        ) {
            (Some(_), Some(declared)) => declared.to_string(),
            _ => {
                return Err(Error::Other(format!(
                    "Property '{}' of '{}' has no nested builder",
                    participant.name, self.model.name
                )))
            }
        };
        let name = participant.name.clone();

        if !self.nested.contains_key(&name) {
            debug!(type_name = %self.model.name, property = %name, "creating nested builder");
            let builder = Builder::create(self.registry, heap, &nested_type)?;
            self.nested.insert(name.clone(), builder);
        }
        if let Some(builder) = self.nested.get_mut(&name) {
            configure(heap, builder)?;
        }
        Ok(self)
    }

    /// `Build(validationRule)`
    ///
    /// Resolves nested builders, then applies `rule`, falling back to the
    /// rule set with [`with_validation_rule`](Self::with_validation_rule).
    pub fn build(self, heap: &mut Heap, rule: Option<Predicate>) -> Result<ObjectId> {
        let Builder {
            model,
            draft,
            nested,
            rule: stored,
            ..
        } = self;

        for (property, builder) in nested {
            let built = builder.build(heap, None)?;
            heap.set(draft, &property, Value::Ref(built))?;
        }

        if let Some(rule) = rule.or(stored) {
            if !rule(heap, draft) {
                return Err(Error::ValidationFailed(crate::util::safe_class_name(&model.name)));
            }
        }
        Ok(draft)
    }

    /// The draft under construction
    pub fn draft(&self) -> ObjectId {
        self.draft
    }

    fn participant(&self, property: &str) -> Result<&'r PropertyModel> {
        let model: &'r TypeModel = self.model;
        crate::eligibility::eligible(model, Strategy::Builder)
            .into_iter()
            .find(|p| p.name == property)
            .ok_or_else(|| Error::UnknownProperty {
                type_name: model.name.clone(),
                property: property.to_string(),
            })
    }
}
