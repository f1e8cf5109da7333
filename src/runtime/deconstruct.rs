//! Deconstruction runtime
//!
//! Reads the include-marked properties of an instance in discovery order.

use super::heap::{Heap, Value};
use super::TypeRegistry;
use crate::eligibility::eligible;
use crate::error::{Error, Result};
use crate::model::Strategy;

/// `Deconstruct(out …)` over the include-marked properties of `type_name`
///
/// A null `instance` fails with [`Error::NullInstance`] before any value is
/// read.
pub fn deconstruct(
    heap: &Heap,
    registry: &TypeRegistry,
    type_name: &str,
    instance: &Value,
) -> Result<Vec<Value>> {
    let model = registry.model(type_name)?;
    let id = match instance {
        Value::Null => return Err(Error::NullInstance(model.name.clone())),
        Value::Ref(id) => *id,
        other => {
            return Err(Error::Other(format!(
                "Cannot deconstruct {:?} as '{}'",
                other, model.name
            )))
        }
    };

    eligible(model, Strategy::Deconstruct)
        .into_iter()
        .map(|p| heap.get(id, &p.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Compilation;

    #[test]
    fn test_null_instance() {
        let c = Compilation::from_yaml(
            "types:\n  - name: Person\n    properties:\n      - { name: FirstName, type: string?, attributes: [IncludeInDeconstruct] }\n",
        )
        .unwrap();
        let registry = TypeRegistry::from_compilation(&c).unwrap();
        let heap = Heap::new();
        let err = deconstruct(&heap, &registry, "Person", &Value::Null).unwrap_err();
        assert!(matches!(err, Error::NullInstance(name) if name == "Person"));
    }
}
