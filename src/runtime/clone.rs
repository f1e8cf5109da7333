//! Clone variants over the heap
//!
//! Mirrors the four emitted members. Safe variants take a [`TraversalChain`]
//! of the instances currently being cloned; an instance already on the chain
//! is returned as is instead of being copied.

use super::heap::{Heap, ObjectId, Value};
use super::TypeRegistry;
use crate::eligibility::{eligible, is_deep_clone};
use crate::error::Result;
use crate::model::Strategy;
use tracing::trace;

/// Identities of the instances currently being cloned, innermost last
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TraversalChain {
    stack: Vec<ObjectId>,
}

impl TraversalChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.stack.contains(&id)
    }

    pub fn push(&mut self, id: ObjectId) {
        self.stack.push(id);
    }

    pub fn pop(&mut self) -> Option<ObjectId> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Depth {
    Shallow,
    Deep,
    DeepSafe,
}

/// Shallow copy; nested objects are shared
pub fn clone(heap: &mut Heap, registry: &TypeRegistry, id: ObjectId) -> Result<ObjectId> {
    copy(heap, registry, id, Depth::Shallow, &mut TraversalChain::new())
}

/// Shallow copy, returning `id` itself when it is already on `chain`
pub fn safe_clone(
    heap: &mut Heap,
    registry: &TypeRegistry,
    id: ObjectId,
    chain: &mut TraversalChain,
) -> Result<ObjectId> {
    guarded(chain, id, |chain| copy(heap, registry, id, Depth::Shallow, chain))
}

/// Copy with deep-eligible containers rebuilt from element `clone`s
pub fn deep_clone(heap: &mut Heap, registry: &TypeRegistry, id: ObjectId) -> Result<ObjectId> {
    copy(heap, registry, id, Depth::Deep, &mut TraversalChain::new())
}

/// Deep copy with element `safe_clone`s sharing one chain
pub fn deep_clone_safe(
    heap: &mut Heap,
    registry: &TypeRegistry,
    id: ObjectId,
    chain: &mut TraversalChain,
) -> Result<ObjectId> {
    guarded(chain, id, |chain| copy(heap, registry, id, Depth::DeepSafe, chain))
}

/// Push `id`, run `f`, pop; the pop happens on the error path too
fn guarded<F>(chain: &mut TraversalChain, id: ObjectId, f: F) -> Result<ObjectId>
where
    F: FnOnce(&mut TraversalChain) -> Result<ObjectId>,
{
    if chain.contains(id) {
        trace!(object = %id, depth = chain.len(), "cycle detected, returning original");
        return Ok(id);
    }
    chain.push(id);
    let result = f(chain);
    chain.pop();
    result
}

fn copy(
    heap: &mut Heap,
    registry: &TypeRegistry,
    id: ObjectId,
    depth: Depth,
    chain: &mut TraversalChain,
) -> Result<ObjectId> {
    let type_name = heap.type_of(id)?.to_string();
    let model = registry.model(&type_name)?;

    let mut values = Vec::new();
    for property in eligible(model, Strategy::Cloneable) {
        let value = heap.get(id, &property.name)?;
        let value = match value.as_ref_id() {
            Some(list) if depth != Depth::Shallow && is_deep_clone(property) && heap.is_list(list) => {
                Value::Ref(rebuild(heap, registry, list, depth, chain)?)
            }
            _ => value,
        };
        values.push((property.name.clone(), value));
    }

    let result = heap.alloc(type_name);
    for (name, value) in values {
        heap.set(result, &name, value)?;
    }
    Ok(result)
}

/// New list whose instance elements are cloned per `depth`
fn rebuild(
    heap: &mut Heap,
    registry: &TypeRegistry,
    list: ObjectId,
    depth: Depth,
    chain: &mut TraversalChain,
) -> Result<ObjectId> {
    let items = heap.list(list)?.to_vec();
    let mut rebuilt = Vec::with_capacity(items.len());
    for item in items {
        let value = match item.as_ref_id() {
            Some(target) if !heap.is_list(target) => Value::Ref(match depth {
                Depth::DeepSafe => safe_clone(heap, registry, target, chain)?,
                _ => clone(heap, registry, target)?,
            }),
            _ => item,
        };
        rebuilt.push(value);
    }
    Ok(heap.alloc_list(rebuilt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Compilation;

    const SCHOOL: &str = r#"
types:
  - name: Student
    namespace: School
    modifiers: [partial]
    attributes: [Cloneable]
    properties:
      - { name: Name, type: string? }
      - { name: Buddy, type: Student? }
      - { name: Courses, type: List<Course>?, attributes: [DeepClone] }
      - { name: Notes, type: List<Course>? }
      - { name: Friends, type: List<Student>?, attributes: [DeepClone] }
      - { name: Secret, type: string?, attributes: [SkipCloneable] }
  - name: Course
    namespace: School
    modifiers: [partial]
    attributes: [Cloneable]
    properties:
      - { name: Title, type: string? }
      - { name: Owner, type: Student? }
"#;

    fn fixture() -> (Heap, TypeRegistry, ObjectId) {
        let registry = TypeRegistry::from_compilation(&Compilation::from_yaml(SCHOOL).unwrap()).unwrap();
        let mut heap = Heap::new();
        let course = registry.alloc(&mut heap, "Course").unwrap();
        heap.set(course, "Title", "Algebra".into()).unwrap();
        let courses = heap.alloc_list(vec![course.into(), Value::Null]);
        let notes = heap.alloc_list(vec![course.into()]);
        let student = registry.alloc(&mut heap, "Student").unwrap();
        heap.set(student, "Name", "Ada".into()).unwrap();
        heap.set(student, "Courses", courses.into()).unwrap();
        heap.set(student, "Notes", notes.into()).unwrap();
        heap.set(student, "Secret", "x".into()).unwrap();
        (heap, registry, student)
    }

    #[test]
    fn test_clone_shares_nested_objects() {
        let (mut heap, registry, student) = fixture();
        let copy = clone(&mut heap, &registry, student).unwrap();
        assert_ne!(copy, student);
        assert_eq!(heap.get(copy, "Name").unwrap(), Value::text("Ada"));
        assert_eq!(heap.get(copy, "Courses").unwrap(), heap.get(student, "Courses").unwrap());
        assert_eq!(heap.get(copy, "Secret").unwrap(), Value::Null);
    }

    #[test]
    fn test_deep_clone_rebuilds_eligible_containers() {
        let (mut heap, registry, student) = fixture();
        let copy = deep_clone(&mut heap, &registry, student).unwrap();

        let original = heap.get(student, "Courses").unwrap().as_ref_id().unwrap();
        let rebuilt = heap.get(copy, "Courses").unwrap().as_ref_id().unwrap();
        assert_ne!(original, rebuilt);
        assert_ne!(heap.list(original).unwrap()[0], heap.list(rebuilt).unwrap()[0]);
        assert_eq!(heap.list(rebuilt).unwrap()[1], Value::Null);
        assert!(heap.structurally_equal(
            &heap.list(original).unwrap()[0],
            &heap.list(rebuilt).unwrap()[0]
        ));

        // not marked, shared
        assert_eq!(heap.get(copy, "Notes").unwrap(), heap.get(student, "Notes").unwrap());
    }

    #[test]
    fn test_safe_clone_returns_original_on_self_cycle() {
        let (mut heap, registry, student) = fixture();
        heap.set(student, "Buddy", student.into()).unwrap();

        let mut chain = TraversalChain::new();
        let copy = safe_clone(&mut heap, &registry, student, &mut chain).unwrap();
        assert_ne!(copy, student);
        assert_eq!(heap.get(copy, "Buddy").unwrap(), Value::Ref(student));
        assert!(chain.is_empty());

        chain.push(student);
        assert_eq!(safe_clone(&mut heap, &registry, student, &mut chain).unwrap(), student);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_deep_clone_safe_returns_original_for_elements_on_chain() {
        let (mut heap, registry, student) = fixture();
        let friends = heap.alloc_list(vec![student.into()]);
        heap.set(student, "Friends", friends.into()).unwrap();

        let mut chain = TraversalChain::new();
        let copy = deep_clone_safe(&mut heap, &registry, student, &mut chain).unwrap();
        assert!(chain.is_empty());

        let rebuilt = heap.get(copy, "Friends").unwrap().as_ref_id().unwrap();
        assert_ne!(rebuilt, friends);
        assert_eq!(heap.list(rebuilt).unwrap(), &[Value::Ref(student)]);

        // the unguarded variant clones the element instead
        let copy = deep_clone(&mut heap, &registry, student).unwrap();
        let rebuilt = heap.get(copy, "Friends").unwrap().as_ref_id().unwrap();
        assert_ne!(heap.list(rebuilt).unwrap()[0], Value::Ref(student));
    }

    #[test]
    fn test_unset_deep_container_stays_null() {
        let (mut heap, registry, student) = fixture();
        let copy = deep_clone(&mut heap, &registry, student).unwrap();
        assert_eq!(heap.get(copy, "Friends").unwrap(), Value::Null);

        let mut chain = TraversalChain::new();
        let copy = deep_clone_safe(&mut heap, &registry, student, &mut chain).unwrap();
        assert_eq!(heap.get(copy, "Friends").unwrap(), Value::Null);
    }

    #[test]
    fn test_chain_unwinds_on_error() {
        let (mut heap, registry, _) = fixture();
        let stray = heap.alloc("School.Unknown");
        let mut chain = TraversalChain::new();
        assert!(safe_clone(&mut heap, &registry, stray, &mut chain).is_err());
        assert!(chain.is_empty());
    }
}
