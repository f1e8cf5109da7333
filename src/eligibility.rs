//! Per-strategy property eligibility
//!
//! Decides from accessors and markers which extracted properties take part in
//! a strategy. Properties shadowed by a more-derived declaration of the same
//! name are dropped before the per-strategy predicate runs.

use crate::model::{PropertyModel, Strategy, TypeModel};
use std::collections::HashSet;
use tracing::debug;

/// Properties of `model` that participate in `strategy`, in discovery order
pub fn eligible(model: &TypeModel, strategy: Strategy) -> Vec<&PropertyModel> {
    most_derived(model)
        .into_iter()
        .filter(|p| is_eligible(p, strategy))
        .collect()
}

/// Per-strategy inclusion predicate for one property
pub fn is_eligible(property: &PropertyModel, strategy: Strategy) -> bool {
    let markers = &property.markers;
    match strategy {
        Strategy::Builder => is_assignable(property) && !markers.skip_builder && !markers.exclude,
        Strategy::Fluent => is_assignable(property) && !markers.skip_fluent && !markers.exclude,
        Strategy::Deconstruct => property.has_public_getter() && markers.include_in_deconstruct,
        Strategy::Cloneable => {
            property.has_public_getter()
                && property.has_public_setter()
                && !markers.skip_clone
                && !markers.exclude
        }
    }
}

/// Whether a cloneable property is rebuilt element-wise by the deep variants
pub fn is_deep_clone(property: &PropertyModel) -> bool {
    property.markers.deep_clone
        && property
            .facts
            .container
            .as_ref()
            .is_some_and(|c| c.element_cloneable)
}

/// Public, writable after construction (not init-only)
fn is_assignable(property: &PropertyModel) -> bool {
    property.has_public_setter() && !property.init_only
}

/// First occurrence of each name; the extractor orders levels most-derived first
fn most_derived(model: &TypeModel) -> Vec<&PropertyModel> {
    let mut seen = HashSet::new();
    model
        .properties
        .iter()
        .filter(|p| {
            let first = seen.insert(p.name.as_str());
            if !first {
                debug!(
                    type_name = %model.name,
                    property = %p.name,
                    declaring_type = %p.declaring_type,
                    "dropping shadowed property"
                );
            }
            first
        })
        .collect()
}
