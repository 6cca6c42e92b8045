use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;

use crate::generator::{
  ast::{RustPrimitive, TypeRef},
  naming::identifiers::{ensure_unique, to_rust_type_name},
  resolver::ReferenceResolver,
  schema_graph::{Component, PrimitiveKind, SchemaNode},
};

/// Type names the generated file defines itself.
pub(crate) const SCAFFOLD_TYPE_NAMES: [&str; 2] = ["ApiError", "ClientError"];

/// Assigns every component a unique Rust type name, in declaration order.
pub(crate) fn assign_model_names(
  components: &IndexMap<String, Component>,
  reserved: &[&str],
) -> HashMap<String, String> {
  let mut used: BTreeSet<String> = reserved.iter().map(ToString::to_string).collect();
  components
    .keys()
    .map(|name| {
      let rust_name = ensure_unique(&to_rust_type_name(name), &used);
      used.insert(rust_name.clone());
      (name.clone(), rust_name)
    })
    .collect()
}

/// Maps schema nodes onto type expressions. Total: anything it cannot
/// express becomes `serde_json::Value`.
pub(crate) struct TypeMapper<'a> {
  resolver: &'a ReferenceResolver<'a>,
  model_names: &'a HashMap<String, String>,
}

impl<'a> TypeMapper<'a> {
  pub(crate) fn new(resolver: &'a ReferenceResolver<'a>, model_names: &'a HashMap<String, String>) -> Self {
    Self { resolver, model_names }
  }

  pub(crate) fn map(&self, node: &SchemaNode) -> TypeRef {
    match node {
      SchemaNode::Reference(pointer) => self.map_reference(pointer),
      SchemaNode::Primitive(kind) => Self::map_primitive(*kind).into(),
      SchemaNode::Array(item) => TypeRef::sequence(self.map(item)),
      SchemaNode::Object(_) => TypeRef::Map,
      SchemaNode::Composite { .. } | SchemaNode::Untyped | SchemaNode::Unsupported(_) => TypeRef::Dynamic,
    }
  }

  /// Rust name of the model a pointer targets.
  pub(crate) fn model_name(&self, pointer: &str) -> Option<String> {
    let name = self.resolver.resolve(pointer).ok()?;
    Some(
      self
        .model_names
        .get(name)
        .cloned()
        .unwrap_or_else(|| to_rust_type_name(name)),
    )
  }

  fn map_reference(&self, pointer: &str) -> TypeRef {
    self.model_name(pointer).map_or(TypeRef::Dynamic, TypeRef::Named)
  }

  fn map_primitive(kind: PrimitiveKind) -> RustPrimitive {
    match kind {
      PrimitiveKind::String => RustPrimitive::String,
      PrimitiveKind::Integer => RustPrimitive::I64,
      PrimitiveKind::Number => RustPrimitive::F64,
      PrimitiveKind::Boolean => RustPrimitive::Bool,
    }
  }
}
