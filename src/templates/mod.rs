//! MiniJinja templates for artifact headers and hint names
//!
//! The header template is embedded; the artifact-name template comes from
//! [`GeneratorConfig::artifact_name`](crate::config::GeneratorConfig).

pub mod filters;

use crate::error::Result;
use minijinja::Environment;
use serde::Serialize;
use std::sync::OnceLock;

// Embedded templates (compiled into binary)
mod embedded {
    pub const HEADER: &str = include_str!("../../templates/header.jinja");
}

/// Template engine singleton
static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

fn init_engine() -> Environment<'static> {
    let mut env = Environment::new();
    filters::register_filters(&mut env);
    env
}

/// Get the global template engine
pub fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// Variables available to the artifact-name template
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactContext {
    pub name: String,
    pub namespace: Option<String>,
    pub strategy: String,
    pub fully_qualified_name: String,
}

/// Variables available to the header template
#[derive(Debug, Clone, Serialize)]
pub struct HeaderContext<'a> {
    pub strategy: &'a str,
    pub fingerprint: Option<String>,
    pub nullable: bool,
    pub usings: &'a [&'a str],
    pub namespace: Option<&'a str>,
}

/// Context used to check that a name template renders
pub fn sample_context() -> ArtifactContext {
    ArtifactContext {
        name: "Pair<K,V>".into(),
        namespace: Some("Sample.Models".into()),
        strategy: "builder".into(),
        fully_qualified_name: "global::Sample.Models.Pair<K,V>".into(),
    }
}

/// Render an artifact hint name
pub fn artifact_name(template: &str, ctx: &ArtifactContext) -> Result<String> {
    let rendered = engine().render_str(template, ctx)?;
    let name = rendered.trim();
    if name.is_empty() {
        return Err(crate::Error::Render("artifact name template rendered empty".into()));
    }
    Ok(name.to_string())
}

/// Render the artifact header, without trailing whitespace
pub fn header(ctx: &HeaderContext<'_>) -> Result<String> {
    let template = engine().template_from_str(embedded::HEADER)?;
    Ok(template.render(ctx)?.trim_end().to_string())
}
