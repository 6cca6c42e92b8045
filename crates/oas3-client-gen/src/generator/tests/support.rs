use serde_json::Value;

use crate::generator::{
  metrics::GenerationStats,
  orchestrator::{GenerationOutput, GeneratorConfig, Orchestrator},
};

pub(super) const PETSTORE_YAML: &str = include_str!("../../../fixtures/petstore.yaml");
pub(super) const INHERITANCE_JSON: &str = include_str!("../../../fixtures/inheritance.json");
pub(super) const ECOMMERCE_YAML: &str = include_str!("../../../fixtures/ecommerce.yaml");

pub(super) fn parse_yaml(source: &str) -> Value {
  let yaml: serde_yaml::Value = serde_yaml::from_str(source).expect("fixture should be valid YAML");
  serde_json::to_value(yaml).expect("fixture should convert to JSON")
}

pub(super) fn parse_json(source: &str) -> Value {
  serde_json::from_str(source).expect("fixture should be valid JSON")
}

pub(super) fn generate(document: Value) -> GenerationOutput {
  generate_with_config(document, GeneratorConfig::default())
}

pub(super) fn generate_with_config(document: Value, config: GeneratorConfig) -> GenerationOutput {
  Orchestrator::new(document, config)
    .generate("fixture.yaml")
    .expect("generation should succeed")
}

pub(super) fn stats_for(document: Value) -> GenerationStats {
  Orchestrator::new(document, GeneratorConfig::default())
    .plan("fixture.yaml")
    .expect("planning should succeed")
    .1
}

pub(super) fn assert_contains(code: &str, expected: &str, context: &str) {
  assert!(code.contains(expected), "missing {context}: expected '{expected}'\n{code}");
}

pub(super) fn assert_not_contains(code: &str, unexpected: &str, context: &str) {
  assert!(!code.contains(unexpected), "unexpected {context}: found '{unexpected}'");
}

pub(super) fn assert_contains_all(code: &str, expected: &[&str], context: &str) {
  for needle in expected {
    assert_contains(code, needle, context);
  }
}

/// Byte offset of `needle`, for ordering assertions.
pub(super) fn position_of(code: &str, needle: &str) -> usize {
  code
    .find(needle)
    .unwrap_or_else(|| panic!("'{needle}' not found in generated code"))
}
