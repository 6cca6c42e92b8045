use strum::Display;

use crate::generator::ast::{GeneratedMethod, GeneratedModel, ModelKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub models_generated: usize,
  pub structs_generated: usize,
  pub type_aliases_generated: usize,
  pub composites_generated: usize,
  pub operations_found: usize,
  pub methods_generated: usize,
  pub security_headers_generated: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_model(&mut self, model: &GeneratedModel) {
    self.models_generated += 1;
    match model.kind {
      ModelKind::Struct => self.structs_generated += 1,
      ModelKind::Alias(_) => self.type_aliases_generated += 1,
    }
    if model.parent_name.is_some() {
      self.composites_generated += 1;
    }
  }

  pub fn record_models(&mut self, models: &[GeneratedModel]) {
    for model in models {
      self.record_model(model);
    }
  }

  pub fn record_method(&mut self, method: &GeneratedMethod) {
    self.methods_generated += 1;
    self.security_headers_generated += method.security.len();
  }

  pub fn record_cycles(&mut self, cycles: Vec<Vec<String>>) {
    self.cycles_detected += cycles.len();
    self.cycle_details.extend(cycles);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    self.warnings.extend(warnings);
  }
}

/// Recoverable problems. Generation degrades and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "Unsupported schema at {location}: {detail}; using serde_json::Value")]
  UnsupportedSchemaShape { location: String, detail: String },
  #[strum(to_string = "[{operation}] {detail}")]
  MalformedOperation { operation: String, detail: String },
  #[strum(to_string = "[{operation}] skipped: {reason}")]
  OperationSkipped { operation: String, reason: String },
  #[strum(to_string = "[{operation}] ignored {location} parameter '{name}'")]
  IgnoredParameter {
    operation: String,
    name: String,
    location: String,
  },
  #[strum(to_string = "Schema '{schema}': additional parent '{pointer}' discarded, only the first allOf reference is inherited")]
  DiscardedParent { schema: String, pointer: String },
}

impl GenerationWarning {
  pub fn is_skipped_item(&self) -> bool {
    matches!(self, Self::OperationSkipped { .. })
  }

  pub(crate) fn malformed(operation: impl Into<String>, detail: impl Into<String>) -> Self {
    Self::MalformedOperation {
      operation: operation.into(),
      detail: detail.into(),
    }
  }

  pub(crate) fn unsupported(location: impl Into<String>, detail: impl Into<String>) -> Self {
    Self::UnsupportedSchemaShape {
      location: location.into(),
      detail: detail.into(),
    }
  }
}
