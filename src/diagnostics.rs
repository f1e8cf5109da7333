//! Structural diagnostics
//!
//! Fluent and Cloneable artifacts add `partial` members to the type itself.
//! A target type declared without `partial` gets a `GEN001` warning;
//! generation still proceeds.

use crate::model::{Strategy, TypeModel};
use serde::Serialize;
use std::fmt;

/// Code of the missing-`partial` warning
pub const MISSING_PARTIAL: &str = "GEN001";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A non-fatal finding reported alongside the artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub severity: Severity,
    pub type_name: String,
    pub strategy: Strategy,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.code, self.message)
    }
}

/// `GEN001` when `strategy` needs a partial type and `model` is not one
pub fn check_partial(model: &TypeModel, strategy: Strategy) -> Option<Diagnostic> {
    if !strategy.requires_partial() || model.is_partial {
        return None;
    }
    Some(Diagnostic {
        code: MISSING_PARTIAL,
        message: format!(
            "Type '{}' must be partial to work with the {} generator.",
            model.name,
            strategy.marker()
        ),
        severity: Severity::Warning,
        type_name: model.qualified_name(),
        strategy,
    })
}
