// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # schemagen: schema-driven companion code generation
//!
//! Given declared data types (properties, attributes, structural modifiers),
//! schemagen deterministically emits companion C# artifacts:
//!
//! - **Builder** (`[AutoClassBuilder]`): a `<Name>Builder` with nested builders and validation
//! - **Fluent** (`[FluentClass]`): in-place `With<Prop>` setters and `Validate()`
//! - **Deconstruct** (`[Deconstruct]`): a `Deconstruct(out …)` extension
//! - **Cloneable** (`[Cloneable]`): `Clone`, `SafeClone`, `DeepClone`, `DeepCloneSafe`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schemagen::{Compilation, Generator, GeneratorConfig, Strategy};
//!
//! let compilation = Compilation::from_yaml(r#"
//! types:
//!   - name: Address
//!     namespace: Demo
//!     attributes: [AutoClassBuilder]
//!     properties:
//!       - { name: City, type: string? }
//!       - { name: State, type: string? }
//! "#)?;
//!
//! let mut generator = Generator::new(GeneratorConfig::default())?;
//! let output = generator.run(&compilation);
//! let builder = output.artifact("Demo.Address", Strategy::Builder).unwrap();
//! assert_eq!(builder.hint_name, "Demo.Address.builder.g.cs");
//! ```
//!
//! Declarations can also be read from C# source with [`parse_csharp`].
//!
//! ## Pipeline
//!
//! ```text
//! Compilation ──► extract ──► TypeModel
//!                               │
//!        ┌──────────────────────┤ per marked Strategy
//!        ▼                      ▼
//!   override gate          GEN001 (missing partial)
//!        │
//!        ▼
//!   cache (TypeModel, Strategy) ──► emit ──► Artifact
//! ```
//!
//! The [`runtime`] module executes what the emitted members promise against an
//! in-memory heap, so clone, builder, fluent and deconstruct behavior can be
//! checked without a C# toolchain.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod eligibility;
pub mod emit;
pub mod error;
pub mod extract;
pub mod model;
pub mod naming;
pub mod overrides;
pub mod parse;
pub mod pipeline;
pub mod runtime;
pub mod schema;
pub mod templates;
pub mod util;

// Re-exports
pub use cache::{CacheKey, GenerationCache};
pub use config::{GeneratorConfig, Indentation, OverrideMethods};
pub use diagnostics::{check_partial, Diagnostic, Severity, MISSING_PARTIAL};
pub use eligibility::{eligible, is_deep_clone, is_eligible};
pub use emit::{render, render_properties, EmitOptions};
pub use error::{Error, Result};
pub use extract::{extract, Extractor};
pub use model::{Markers, PropertyModel, Strategy, TypeFacts, TypeModel, TypeShape};
pub use naming::VariableNamingContext;
pub use overrides::{find_override, gate, Gate, SuppressReason};
pub use parse::{parse_csharp, syntax_errors, SyntaxError};
pub use pipeline::{Artifact, Failure, Generator, PassOutput, PassStats, Suppression};
pub use schema::{
    Accessibility, Compilation, DeclarationKind, MethodDeclaration, Modifier,
    PropertyDeclaration, TypeDeclaration, TypeRef,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
