//! Deconstructor emission
//!
//! A static `<Name>Extensions` class with one `Deconstruct` extension method
//! whose `out` parameters follow the include-marked properties in discovery
//! order.

use crate::model::{PropertyModel, TypeModel};
use crate::naming::VariableNamingContext;
use crate::schema::Accessibility;
use crate::util::{parameter_name, safe_class_name};
use genco::prelude::*;

pub const USINGS: &[&str] = &["System"];

pub fn tokens(model: &TypeModel, properties: &[&PropertyModel]) -> csharp::Tokens {
    let outputs: Vec<String> = properties.iter().map(|p| parameter_name(&p.name)).collect();
    let mut naming = VariableNamingContext::new(outputs.iter().cloned());
    let input = naming.get("input");

    let mut parameters = vec![format!("this {} {}", model.display_name(), input)];
    parameters.extend(
        properties
            .iter()
            .zip(&outputs)
            .map(|(p, name)| format!("out {} {}", p.type_name, name)),
    );

    // an extension over an internal type cannot be public
    let visibility = if model.accessibility == Accessibility::Public {
        "public"
    } else {
        "internal"
    };
    let class_head = format!(
        "{} static partial class {}Extensions",
        visibility,
        safe_class_name(&model.name)
    );
    let method_head = super::with_constraints(
        format!(
            "public static void Deconstruct{}({})",
            model.generic_suffix(),
            parameters.join(", ")
        ),
        model,
    );

    let mut body = csharp::Tokens::new();
    if !model.is_value_type() {
        body.append(format!(
            "global::System.ArgumentNullException.ThrowIfNull({});",
            input
        ));
        body.push();
    }

    match properties {
        [single] if !single.markers.exclude => {
            body.append(format!("{} = {}.{};", outputs[0], input, single.name));
        }
        _ => {
            let targets = outputs.join(", ");
            let sources: Vec<String> = properties
                .iter()
                .map(|p| format!("{}.{}", input, p.name))
                .collect();
            body.append(format!("({}) =", targets));
            body.indent();
            body.append(format!("({});", sources.join(", ")));
            body.unindent();
        }
    }

    quote! {
        $(class_head)
        {
            $(method_head)
            {
                $body
            }
        }
    }
}
