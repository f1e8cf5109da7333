//! Fluent Mutator emission
//!
//! A `partial` re-declaration of the type with validation-aware constructors
//! and one in-place `With<Prop>` setter per eligible property.

use crate::model::{PropertyModel, TypeModel};
use crate::util::parameter_name;
use genco::prelude::*;

pub const USINGS: &[&str] = &[
    "System",
    "System.Collections",
    "System.Collections.Generic",
    "System.Linq",
];

pub fn tokens(model: &TypeModel, properties: &[&PropertyModel]) -> csharp::Tokens {
    let target = model.display_name();
    let rule = format!("Func<{}, bool>?", target);
    let head = format!(
        "{} partial {} {}",
        model.accessibility.keyword(),
        model.type_keyword(),
        target
    );

    let mut setters = csharp::Tokens::new();
    for property in properties {
        let parameter = parameter_name(&property.name);
        setters.append(quote! {
            public $(&target) With$(&property.name)($(&property.type_name) $(&parameter))
            {
                this.$(&property.name) = $(&parameter);
                return this;
            }
        });
        setters.line();
    }

    quote! {
        $(head)
        {
            private readonly $(&rule) _validationRule;

            public $(&model.name)() { }

            public $(&model.name)($(&rule) validationRule = null)
            {
                _validationRule = validationRule;
            }

            $setters
            public bool Validate()
            {
                return _validationRule?.Invoke(this) ?? true;
            }
        }
    }
}
