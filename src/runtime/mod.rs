//! Runtime contract of the emitted artifacts
//!
//! Executes what the generated members promise, against an in-memory
//! [`Heap`]: clones with an explicit traversal chain, builders with nested
//! builders and validation, fluent in-place mutation, deconstruction with a
//! null guard. Property participation comes from the same eligibility rules
//! the emitters use.

pub mod builder;
pub mod clone;
pub mod deconstruct;
pub mod fluent;
pub mod heap;

pub use builder::Builder;
pub use clone::{clone, deep_clone, deep_clone_safe, safe_clone, TraversalChain};
pub use deconstruct::deconstruct;
pub use fluent::FluentObject;
pub use heap::{Heap, Instance, ObjectId, Value};

use crate::eligibility::eligible;
use crate::error::{Error, Result};
use crate::extract::Extractor;
use crate::model::{PropertyModel, Strategy, TypeModel};
use crate::schema::Compilation;
use std::collections::BTreeMap;

/// Validation predicate over a draft instance
pub type Predicate = Box<dyn Fn(&Heap, ObjectId) -> bool>;

/// Extracted models of every type in a compilation, by qualified name
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    models: BTreeMap<String, TypeModel>,
}

impl TypeRegistry {
    /// Extract every declared type; the first extraction error is returned
    pub fn from_compilation(compilation: &Compilation) -> Result<Self> {
        let extractor = Extractor::new(compilation);
        let mut models = BTreeMap::new();
        for declaration in &compilation.types {
            let name = declaration.qualified_name();
            if !models.contains_key(&name) {
                let model = extractor.extract(&name)?;
                models.insert(name, model);
            }
        }
        Ok(Self { models })
    }

    /// Model by qualified name, or by simple name when that is unambiguous
    pub fn model(&self, type_name: &str) -> Result<&TypeModel> {
        if let Some(model) = self.models.get(type_name) {
            return Ok(model);
        }
        let mut candidates = self.models.values().filter(|m| m.name == type_name);
        match (candidates.next(), candidates.next()) {
            (Some(model), None) => Ok(model),
            _ => Err(Error::UnknownType(type_name.to_string())),
        }
    }

    /// Participating properties of `type_name` for `strategy`
    pub fn participants(&self, type_name: &str, strategy: Strategy) -> Result<Vec<&PropertyModel>> {
        Ok(eligible(self.model(type_name)?, strategy))
    }

    /// Allocate an instance of a registered type
    pub fn alloc(&self, heap: &mut Heap, type_name: &str) -> Result<ObjectId> {
        let model = self.model(type_name)?;
        Ok(heap.alloc(model.qualified_name()))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
