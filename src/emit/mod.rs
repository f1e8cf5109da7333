//! C# emission using genco
//!
//! Each strategy module renders the body of one artifact from a `TypeModel`
//! and its eligible properties. [`render`] adds the header and applies the
//! configured indentation. Rendering is pure: equal inputs give byte-identical
//! text.

pub mod builder;
pub mod cloneable;
pub mod deconstruct;
pub mod fluent;

use crate::config::{GeneratorConfig, Indentation};
use crate::eligibility::eligible;
use crate::error::{Error, Result};
use crate::model::{PropertyModel, Strategy, TypeModel};
use crate::templates::{self, HeaderContext};
use genco::fmt;
use genco::lang::Csharp;
use genco::prelude::*;

/// Formatting switches taken from [`GeneratorConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    pub indentation: Indentation,
    pub provenance: bool,
    pub nullable_context: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

impl From<&GeneratorConfig> for EmitOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            indentation: config.indentation,
            provenance: config.provenance,
            nullable_context: config.nullable_context,
        }
    }
}

/// Render one artifact for `(model, strategy)` over its eligible properties
pub fn render(model: &TypeModel, strategy: Strategy, options: &EmitOptions) -> Result<String> {
    let properties = eligible(model, strategy);
    render_properties(model, strategy, &properties, options)
}

/// Render with an explicit property list
pub fn render_properties(
    model: &TypeModel,
    strategy: Strategy,
    properties: &[&PropertyModel],
    options: &EmitOptions,
) -> Result<String> {
    let (usings, body) = match strategy {
        Strategy::Builder => (builder::USINGS, builder::tokens(model, properties)),
        Strategy::Fluent => (fluent::USINGS, fluent::tokens(model, properties)),
        Strategy::Deconstruct => (deconstruct::USINGS, deconstruct::tokens(model, properties)),
        Strategy::Cloneable => (cloneable::USINGS, cloneable::tokens(model, properties)),
    };

    let header = templates::header(&HeaderContext {
        strategy: strategy.as_str(),
        fingerprint: options.provenance.then(|| model.fingerprint()),
        nullable: options.nullable_context,
        usings,
        namespace: model.namespace.as_deref(),
    })?;

    let body = format(&body, options.indentation)?;
    Ok(format!("{}\n\n{}\n", header, body.trim()))
}

/// Format tokens as a file with the given indentation
fn format(tokens: &csharp::Tokens, indentation: Indentation) -> Result<String> {
    let indentation = match indentation {
        Indentation::Tab => fmt::Indentation::Tab,
        Indentation::Spaces(n) => fmt::Indentation::Space(n),
    };
    let fmt = fmt::Config::from_lang::<Csharp>().with_indentation(indentation);
    let config = csharp::Config::default();

    let mut w = fmt::FmtWriter::new(String::new());
    tokens
        .format_file(&mut w.as_formatter(&fmt), &config)
        .map_err(|e| Error::Render(e.to_string()))?;
    Ok(w.into_inner())
}

/// `/// <summary>` block
pub(crate) fn summary(text: &str) -> csharp::Tokens {
    quote! {
        $("/// <summary>")
        $(format!("/// {}", text))
        $("/// </summary>")
    }
}

/// Type or method head with its `where` clauses on the same line
pub(crate) fn with_constraints(head: String, model: &TypeModel) -> String {
    if model.constraints.is_empty() {
        head
    } else {
        format!("{} {}", head, model.constraints.join(" "))
    }
}
