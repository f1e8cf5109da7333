//! Cloneable emission
//!
//! Four members on a `partial` re-declaration of the type:
//!
//! - `Clone()` copies every eligible property, no cycle check
//! - `SafeClone(referenceChain)` copies, returning `this` when already on the chain
//! - `DeepClone()` also rebuilds deep-eligible containers element-wise
//! - `DeepCloneSafe(referenceChain)` the deep variant with the chain threaded through
//!
//! The reference chain is compared by object identity.

use crate::eligibility::is_deep_clone;
use crate::model::{PropertyModel, TypeModel};
use genco::prelude::*;

pub const USINGS: &[&str] = &["System", "System.Collections.Generic", "System.Linq"];

/// Containers rebuilt with `ToList()`
const LIST_LIKE: &[&str] = &[
    "List",
    "IList",
    "ICollection",
    "IEnumerable",
    "IReadOnlyList",
    "IReadOnlyCollection",
];

/// Containers rebuilt with `ToHashSet()`
const SET_LIKE: &[&str] = &["HashSet", "ISet"];

#[derive(Clone, Copy)]
enum Variant {
    Clone,
    SafeClone,
    DeepClone,
    DeepCloneSafe,
}

impl Variant {
    fn deep(self) -> bool {
        matches!(self, Variant::DeepClone | Variant::DeepCloneSafe)
    }

    fn safe(self) -> bool {
        matches!(self, Variant::SafeClone | Variant::DeepCloneSafe)
    }
}

pub fn tokens(model: &TypeModel, properties: &[&PropertyModel]) -> csharp::Tokens {
    let target = model.display_name();
    let head = format!(
        "{} partial {} {}",
        model.accessibility.keyword(),
        model.type_keyword(),
        target
    );

    quote! {
        $(head)
        {
            $(super::summary(&format!("Creates a shallow clone of {} with no circular reference check.", model.name)))
            public $(&target) Clone()
            $(method_body(model, properties, Variant::Clone))

            $(super::summary(&format!("Creates a shallow clone of {} with circular reference check.", model.name)))
            public $(&target) SafeClone(Stack<object>? referenceChain = null)
            $(method_body(model, properties, Variant::SafeClone))

            $(super::summary(&format!("Creates a deep clone of {} with no circular reference check.", model.name)))
            public $(&target) DeepClone()
            $(method_body(model, properties, Variant::DeepClone))

            $(super::summary(&format!("Creates a deep clone of {} with circular reference check.", model.name)))
            public $(&target) DeepCloneSafe(Stack<object>? referenceChain = null)
            $(method_body(model, properties, Variant::DeepCloneSafe))
        }
    }
}

fn method_body(model: &TypeModel, properties: &[&PropertyModel], variant: Variant) -> csharp::Tokens {
    let target = model.display_name();

    let mut assignments = csharp::Tokens::new();
    for property in properties {
        assignments.append(format!(
            "{} = {},",
            property.name,
            clone_expression(property, variant)
        ));
        assignments.push();
    }

    if variant.safe() {
        quote! {
            {
                if (referenceChain is not null && referenceChain.Any(item => ReferenceEquals(item, this)))
                {
                    return this;
                }

                referenceChain ??= new Stack<object>();
                referenceChain.Push(this);

                var result = new $(&target)
                {
                    $assignments
                };

                referenceChain.Pop();
                return result;
            }
        }
    } else {
        quote! {
            {
                return new $(&target)
                {
                    $assignments
                };
            }
        }
    }
}

/// Right-hand side of one initializer entry
fn clone_expression(property: &PropertyModel, variant: Variant) -> String {
    let source = format!("this.{}", property.name);
    let container = match property.facts.container.as_ref() {
        Some(container) if variant.deep() && is_deep_clone(property) => container,
        _ => return source,
    };

    let element = if variant.safe() {
        "item => item.SafeClone(referenceChain)"
    } else {
        "item => item.Clone()"
    };
    // an unset container stays null, whatever its annotation says
    if LIST_LIKE.contains(&container.container.as_str()) {
        format!("{}?.Select({}).ToList()", source, element)
    } else if SET_LIKE.contains(&container.container.as_str()) {
        format!("{}?.Select({}).ToHashSet()", source, element)
    } else {
        let constructed = property.type_name.trim_end_matches('?');
        format!(
            "{} is null ? null : new {}({}.Select({}))",
            source, constructed, source, element
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::emit::tests::model_from;
    use crate::emit::{render, EmitOptions};
    use crate::model::Strategy;

    const SCHOOL: &str = r#"
types:
  - name: Student
    namespace: School
    modifiers: [partial]
    attributes: [Cloneable]
    properties:
      - { name: Name, type: string? }
      - { name: Age, type: int }
      - { name: CourseNames, type: List<string>?, attributes: [DeepClone] }
      - { name: Courses, type: List<Course>?, attributes: [DeepClone] }
      - { name: Mentors, type: HashSet<Course>, attributes: [Clone] }
      - { name: Queue, type: Queue<Course>?, attributes: [Clone] }
      - { name: Cache, type: string?, attributes: [SkipCloneable] }
  - name: Course
    namespace: School
    modifiers: [partial]
    attributes: [Cloneable]
    properties:
      - { name: CourseId, type: int }
"#;

    fn student() -> String {
        let model = model_from(SCHOOL, "School.Student");
        render(&model, Strategy::Cloneable, &EmitOptions::default()).unwrap()
    }

    #[test]
    fn test_four_variants_are_emitted() {
        let text = student();
        assert!(text.contains("public partial class Student\n{"));
        assert!(text.contains("public Student Clone()\n"));
        assert!(text.contains("public Student SafeClone(Stack<object>? referenceChain = null)\n"));
        assert!(text.contains("public Student DeepClone()\n"));
        assert!(text.contains("public Student DeepCloneSafe(Stack<object>? referenceChain = null)\n"));
        assert!(text.contains("/// <summary>"));
        assert!(!text.contains("Cache ="));
    }

    #[test]
    fn test_safe_variants_track_identity() {
        let text = student();
        assert!(text.contains(
            "if (referenceChain is not null && referenceChain.Any(item => ReferenceEquals(item, this)))"
        ));
        assert!(text.contains("referenceChain ??= new Stack<object>();"));
        assert!(text.contains("referenceChain.Push(this);"));
        assert!(text.contains("referenceChain.Pop();"));
        assert_eq!(text.matches("referenceChain.Pop();").count(), 2);
    }

    #[test]
    fn test_deep_containers_are_rebuilt_element_wise() {
        let text = student();
        assert!(text.contains("Courses = this.Courses?.Select(item => item.Clone()).ToList(),"));
        assert!(text.contains(
            "Courses = this.Courses?.Select(item => item.SafeClone(referenceChain)).ToList(),"
        ));
        assert!(text.contains("Mentors = this.Mentors?.Select(item => item.Clone()).ToHashSet(),"));
        assert!(text.contains(
            "Queue = this.Queue is null ? null : new global::System.Collections.Generic.Queue<global::School.Course>(this.Queue.Select(item => item.Clone())),"
        ));
        // strings are not cloneable classes
        assert!(text.contains("CourseNames = this.CourseNames,"));
        assert_eq!(text.matches("Courses = this.Courses,").count(), 2);
    }

    #[test]
    fn test_unannotated_container_is_null_guarded() {
        let model = model_from(
            r#"
types:
  - name: Classroom
    namespace: School
    modifiers: [partial]
    attributes: [Cloneable]
    properties:
      - { name: Pupils, type: List<Pupil>, attributes: [DeepClone] }
  - name: Pupil
    namespace: School
    modifiers: [partial]
    attributes: [Cloneable]
"#,
            "School.Classroom",
        );
        let text = render(&model, Strategy::Cloneable, &EmitOptions::default()).unwrap();

        assert!(text.contains("Pupils = this.Pupils?.Select(item => item.Clone()).ToList(),"));
        assert!(text.contains(
            "Pupils = this.Pupils?.Select(item => item.SafeClone(referenceChain)).ToList(),"
        ));
        assert!(!text.contains("this.Pupils.Select"));
    }
}
