//! Generation pass orchestration
//!
//! Extract → eligibility → override gate → diagnostics → emit, once per
//! distinct `(TypeModel, Strategy)`. Emission of cache misses runs on the
//! rayon pool when enabled; results are merged in request order so the
//! output order does not depend on scheduling.

use crate::cache::{CacheKey, GenerationCache};
use crate::config::GeneratorConfig;
use crate::diagnostics::{check_partial, Diagnostic};
use crate::eligibility::eligible;
use crate::emit::{self, EmitOptions};
use crate::error::Result;
use crate::extract::Extractor;
use crate::model::{Strategy, TypeModel};
use crate::overrides::{gate, Gate, SuppressReason};
use crate::schema::Compilation;
use crate::templates::{self, ArtifactContext};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, debug_span, warn};

/// A named text artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub hint_name: String,
    /// Qualified name of the target type
    pub type_name: String,
    pub strategy: Strategy,
    pub text: Arc<str>,
}

/// A request that produced no artifact on purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suppression {
    pub type_name: String,
    pub strategy: Strategy,
    #[serde(flatten)]
    pub reason: SuppressReason,
}

/// A request or type that failed; the rest of the pass is unaffected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub type_name: String,
    pub strategy: Option<Strategy>,
    pub error: String,
}

/// Counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    /// Requests derived from declaration sites, before de-duplication
    pub requests: usize,
    pub computed: usize,
    pub reused: usize,
    pub deduplicated: usize,
    pub suppressed: usize,
    pub failed: usize,
    pub evicted: usize,
}

/// Everything a pass reports back to the host
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassOutput {
    pub artifacts: Vec<Artifact>,
    pub diagnostics: Vec<Diagnostic>,
    pub suppressions: Vec<Suppression>,
    pub failures: Vec<Failure>,
    pub stats: PassStats,
}

impl PassOutput {
    /// Artifact for `(qualified type name, strategy)`
    pub fn artifact(&self, type_name: &str, strategy: Strategy) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|a| a.type_name == type_name && a.strategy == strategy)
    }
}

/// Runs passes over successive compilations, reusing unchanged artifacts
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    cache: GenerationCache,
}

/// A request that survived the gate and needs text
struct Pending {
    key: CacheKey,
    text: Option<Arc<str>>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: GenerationCache::new(),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Number of artifacts held for the next pass
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Run one generation pass
    pub fn run(&mut self, compilation: &Compilation) -> PassOutput {
        let span = debug_span!("generation_pass", types = compilation.types.len());
        let _guard = span.enter();

        let options = EmitOptions::from(&self.config);
        self.cache.begin_pass(&options);

        let mut output = PassOutput::default();
        let models = self.extract_models(compilation, &mut output);

        // one request per (declaration site, marked strategy), de-duplicated by full key
        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        for declaration in &compilation.types {
            let qualified = declaration.qualified_name();
            let Some(Ok(model)) = models.get(&qualified) else {
                continue;
            };
            let parts = compilation.parts_of(&qualified);
            for strategy in Strategy::ALL {
                if !self.config.is_enabled(strategy)
                    || !parts.iter().any(|p| p.has_attribute(strategy.marker()))
                {
                    continue;
                }
                output.stats.requests += 1;

                let key = CacheKey::new(model.clone(), strategy);
                if !seen.insert(key.clone()) {
                    output.stats.deduplicated += 1;
                    continue;
                }

                if let Some(reason) = self.gate(compilation, model, strategy) {
                    debug!(type_name = %qualified, %strategy, %reason, "suppressed");
                    output.stats.suppressed += 1;
                    output.suppressions.push(Suppression {
                        type_name: qualified.clone(),
                        strategy,
                        reason,
                    });
                    continue;
                }

                if let Some(diagnostic) = check_partial(model, strategy) {
                    warn!(type_name = %qualified, code = diagnostic.code, "{}", diagnostic.message);
                    output.diagnostics.push(diagnostic);
                }

                let text = self.cache.get(&key);
                if text.is_some() {
                    debug!(type_name = %qualified, %strategy, "reusing cached artifact");
                    output.stats.reused += 1;
                }
                pending.push(Pending { key, text });
            }
        }

        let rendered = self.render_missing(&pending);

        for (item, result) in pending.into_iter().zip(rendered) {
            let type_name = item.key.model.qualified_name();
            let strategy = item.key.strategy;
            let text = match (item.text, result) {
                (Some(text), _) => text,
                (None, Some(Ok(text))) => {
                    output.stats.computed += 1;
                    let text: Arc<str> = Arc::from(text);
                    self.cache.insert(item.key.clone(), text.clone());
                    text
                }
                (None, Some(Err(e))) => {
                    warn!(type_name = %type_name, %strategy, error = %e, "emission failed");
                    output.stats.failed += 1;
                    output.failures.push(Failure {
                        type_name,
                        strategy: Some(strategy),
                        error: e.to_string(),
                    });
                    continue;
                }
                // cached entries are never rendered
                (None, None) => continue,
            };

            match self.hint_name(&item.key.model, strategy) {
                Ok(hint_name) => output.artifacts.push(Artifact {
                    hint_name,
                    type_name,
                    strategy,
                    text,
                }),
                Err(e) => {
                    warn!(type_name = %type_name, %strategy, error = %e, "artifact naming failed");
                    output.stats.failed += 1;
                    output.failures.push(Failure {
                        type_name,
                        strategy: Some(strategy),
                        error: e.to_string(),
                    });
                }
            }
        }

        output.stats.evicted = self.cache.end_pass();
        debug!(
            artifacts = output.artifacts.len(),
            computed = output.stats.computed,
            reused = output.stats.reused,
            deduplicated = output.stats.deduplicated,
            suppressed = output.stats.suppressed,
            failed = output.stats.failed,
            "pass complete"
        );
        output
    }

    /// Extract each distinct type once; failures are recorded per type
    fn extract_models(
        &self,
        compilation: &Compilation,
        output: &mut PassOutput,
    ) -> HashMap<String, Result<TypeModel>> {
        let mut names: Vec<String> = Vec::new();
        for declaration in &compilation.types {
            let qualified = declaration.qualified_name();
            if !names.contains(&qualified) {
                names.push(qualified);
            }
        }

        let extractor = Extractor::new(compilation);
        let extract = |name: &String| (name.clone(), extractor.extract(name));
        let results: Vec<(String, Result<TypeModel>)> = if self.config.parallel {
            names.par_iter().map(extract).collect()
        } else {
            names.iter().map(extract).collect()
        };

        for (name, result) in &results {
            if let Err(e) = result {
                warn!(type_name = %name, error = %e, "extraction failed");
                output.stats.failed += 1;
                output.failures.push(Failure {
                    type_name: name.clone(),
                    strategy: None,
                    error: e.to_string(),
                });
            }
        }
        results.into_iter().collect()
    }

    fn gate(
        &self,
        compilation: &Compilation,
        model: &TypeModel,
        strategy: Strategy,
    ) -> Option<SuppressReason> {
        let participants = eligible(model, strategy).len();
        let method = self.config.override_methods.get(strategy);
        match gate(compilation, model, method, participants) {
            Gate::Emit => None,
            Gate::Suppress(reason) => Some(reason),
        }
    }

    /// Render every pending request without cached text, in request order
    fn render_missing(&self, pending: &[Pending]) -> Vec<Option<Result<String>>> {
        let options = EmitOptions::from(&self.config);
        let render = |item: &Pending| match item.text {
            Some(_) => None,
            None => Some(emit::render(&item.key.model, item.key.strategy, &options)),
        };
        if self.config.parallel {
            pending.par_iter().map(render).collect()
        } else {
            pending.iter().map(render).collect()
        }
    }

    fn hint_name(&self, model: &TypeModel, strategy: Strategy) -> Result<String> {
        templates::artifact_name(
            &self.config.artifact_name,
            &ArtifactContext {
                name: model.name.clone(),
                namespace: model.namespace.clone(),
                strategy: strategy.as_str().to_string(),
                fully_qualified_name: model.fully_qualified_name.clone(),
            },
        )
    }
}
