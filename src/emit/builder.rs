//! Class Builder emission
//!
//! A companion `<Name>Builder` class holding a draft instance. Properties
//! whose type is itself builder-annotated get a nested builder, created on
//! first use of the callback setter and resolved into the draft by `Build`.

use crate::model::{PropertyModel, TypeModel};
use crate::util::{parameter_name, safe_class_name, to_camel_case};
use genco::prelude::*;

pub const USINGS: &[&str] = &["System"];

/// Builder class name without generic parameters
pub fn builder_name(model: &TypeModel) -> String {
    format!("{}Builder", safe_class_name(&model.name))
}

pub fn tokens(model: &TypeModel, properties: &[&PropertyModel]) -> csharp::Tokens {
    let target = model.display_name();
    let builder = builder_name(model);
    let builder_type = format!("{}{}", builder, model.generic_suffix());
    let rule = format!("Func<{}, bool>?", target);
    let head = super::with_constraints(
        format!("{} class {}", model.accessibility.keyword(), builder_type),
        model,
    );
    let message = format!("Validation failed for {}.", safe_class_name(&model.name));

    let nested: Vec<&PropertyModel> = properties
        .iter()
        .copied()
        .filter(|p| p.facts.nested_builder.is_some())
        .collect();

    // setters write through `_instance`, which a readonly struct field rejects
    let instance_modifier = if model.is_value_type() { "private" } else { "private readonly" };

    let mut fields = csharp::Tokens::new();
    fields.append(quote!($(instance_modifier) $(&target) _instance = new $(&target)();));
    for property in &nested {
        let nested_type = property.facts.nested_builder.as_deref().unwrap_or_default();
        fields.push();
        fields.append(quote!(private $(nested_type)? $(field_name(property)) = null;));
    }
    fields.push();
    fields.append(quote!(private $(&rule) _validationRule = null;));

    let mut setters = csharp::Tokens::new();
    for property in properties {
        let method = format!("With{}", property.name);
        if let Some(nested_type) = property.facts.nested_builder.as_deref() {
            let field = field_name(property);
            let action = format!("{}BuilderAction", to_camel_case(&property.name));
            setters.append(quote! {
                public $(&builder_type) $(&method)(Action<$(nested_type)> $(&action))
                {
                    $(&field) ??= $(nested_type).Create();
                    $(&action)($(&field));
                    return this;
                }
            });
            setters.line();
        }

        let parameter = parameter_name(&property.name);
        setters.append(quote! {
            public $(&builder_type) $(&method)($(&property.type_name) $(&parameter))
            {
                _instance.$(&property.name) = $(&parameter);
                return this;
            }
        });
        setters.line();
    }

    let mut resolve = csharp::Tokens::new();
    for property in &nested {
        let field = field_name(property);
        resolve.append(quote! {
            if ($(&field) is not null)
            {
                _instance.$(&property.name) = $(&field).Build();
            }
        });
        resolve.line();
    }

    quote! {
        $(head)
        {
            $fields

            private $(&builder)() { }

            public static $(&builder_type) Create() => new $(&builder_type)();

            public $(&builder_type) WithValidationRule($(&rule) validationRule)
            {
                _validationRule = validationRule;
                return this;
            }

            $setters
            public $(&target) Build($(&rule) validationRule = null)
            {
                $resolve
                _validationRule = validationRule ?? _validationRule;
                if (_validationRule != null && !_validationRule(_instance))
                {
                    throw new ArgumentException($(quoted(message)));
                }

                return _instance;
            }
        }
    }
}

fn field_name(property: &PropertyModel) -> String {
    format!("_{}Builder", to_camel_case(&property.name))
}
