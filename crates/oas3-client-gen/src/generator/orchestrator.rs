//! One generation pass from a parsed document to client source text.
//!
//! ```no_run
//! # fn example(document: serde_json::Value) -> anyhow::Result<()> {
//! let orchestrator = Orchestrator::new(document, GeneratorConfig::default());
//! let output = orchestrator.generate("openapi.yaml")?;
//! std::fs::write("client.rs", output.code)?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;

use serde_json::Value;

pub use crate::generator::operation_synthesizer::{ParameterMerge, QueryParams};
use crate::generator::{
  codegen::{CodeMetadata, GenerationUnit, Renderer, RustRenderer},
  error::GenerationError,
  lowering::DocumentLowering,
  metrics::GenerationStats,
  model_composer::ModelComposer,
  naming::identifiers::{ensure_unique, to_rust_type_name},
  operation_synthesizer::OperationSynthesizer,
  resolver::ReferenceResolver,
  type_mapper::{SCAFFOLD_TYPE_NAMES, TypeMapper, assign_model_names},
};

/// Methods the client scaffold defines itself.
const SCAFFOLD_METHOD_NAMES: [&str; 4] = ["new", "close", "base_url", "api_error"];

#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct GeneratorConfig {
  /// Overrides the `<Title>Client` default.
  pub client_name: Option<String>,
  #[builder(default)]
  pub parameter_merge: ParameterMerge,
  #[builder(default)]
  pub query_params: QueryParams,
}

#[derive(Debug)]
pub struct GenerationOutput {
  pub code: String,
  pub stats: GenerationStats,
}

/// Owns one document and produces one artifact. Nothing is shared between
/// instances.
pub struct Orchestrator {
  document: Value,
  config: GeneratorConfig,
}

impl Orchestrator {
  pub fn new(document: Value, config: GeneratorConfig) -> Self {
    Self { document, config }
  }

  /// Lowers, resolves, composes and synthesizes without rendering.
  pub fn plan(&self, source_path: &str) -> Result<(GenerationUnit, GenerationStats), GenerationError> {
    let mut stats = GenerationStats::default();

    let lowered = DocumentLowering::lower(&self.document)?;
    stats.record_warnings(lowered.warnings);
    let document = lowered.document;

    let resolver = ReferenceResolver::new(&document.components);
    resolver.verify_document(&document)?;

    let client_name = self.client_name(&document.info.title);
    let mut reserved_types = SCAFFOLD_TYPE_NAMES.to_vec();
    reserved_types.push(client_name.as_str());
    let model_names = assign_model_names(&document.components, &reserved_types);

    let mapper = TypeMapper::new(&resolver, &model_names);
    let composed = ModelComposer::new(&document.components, &resolver, &mapper, &model_names).compose()?;
    stats.record_models(&composed.models);
    stats.record_cycles(composed.cycles);
    stats.record_warnings(composed.warnings);

    let synthesizer = OperationSynthesizer::new(&mapper, &document.security_schemes, document.security.as_deref())
      .with_policies(self.config.parameter_merge, self.config.query_params);

    let mut used_method_names: BTreeSet<String> = SCAFFOLD_METHOD_NAMES.iter().map(ToString::to_string).collect();
    let mut methods = vec![];
    for (item, operation) in document.operations() {
      stats.operations_found += 1;
      let synthesized = synthesizer.synthesize(item, operation);
      stats.record_warnings(synthesized.warnings);

      if let Some(mut method) = synthesized.method {
        method.name = ensure_unique(&method.name, &used_method_names);
        used_method_names.insert(method.name.clone());
        stats.record_method(&method);
        methods.push(method);
      }
    }

    let unit = GenerationUnit {
      metadata: CodeMetadata {
        title: document.info.title,
        version: document.info.version,
        description: document.info.description,
        source: source_path.to_string(),
      },
      client_name,
      models: composed.models,
      methods,
    };

    Ok((unit, stats))
  }

  /// Generates the client with the default Rust renderer.
  pub fn generate(&self, source_path: &str) -> anyhow::Result<GenerationOutput> {
    self.generate_with(&RustRenderer, source_path)
  }

  pub fn generate_with(&self, renderer: &dyn Renderer, source_path: &str) -> anyhow::Result<GenerationOutput> {
    let (unit, stats) = self.plan(source_path)?;
    let code = renderer.render(&unit)?;
    Ok(GenerationOutput { code, stats })
  }

  fn client_name(&self, title: &str) -> String {
    match &self.config.client_name {
      Some(name) => to_rust_type_name(name),
      None => format!("{}Client", to_rust_type_name(title)),
    }
  }
}
