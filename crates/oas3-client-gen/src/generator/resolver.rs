use indexmap::IndexMap;

use crate::generator::{
  error::GenerationError,
  schema_graph::{ApiDocument, Component, ObjectShape, SCHEMA_REF_PREFIX, SchemaNode},
};

/// Resolves `#/components/schemas/<Name>` pointers against one document.
pub(crate) struct ReferenceResolver<'a> {
  components: &'a IndexMap<String, Component>,
}

impl<'a> ReferenceResolver<'a> {
  pub(crate) fn new(components: &'a IndexMap<String, Component>) -> Self {
    Self { components }
  }

  /// Component name a pointer targets, checked against the document.
  pub(crate) fn resolve<'p>(&self, pointer: &'p str) -> Result<&'p str, GenerationError> {
    Self::component_name(pointer)
      .filter(|name| self.components.contains_key(*name))
      .ok_or_else(|| GenerationError::unresolved(pointer, "<unknown>"))
  }

  pub(crate) fn component(&self, pointer: &str) -> Option<&'a Component> {
    Self::component_name(pointer).and_then(|name| self.components.get(name))
  }

  /// Shape check only: strips the local schema prefix.
  pub(crate) fn component_name(pointer: &str) -> Option<&str> {
    pointer
      .strip_prefix(SCHEMA_REF_PREFIX)
      .filter(|name| !name.is_empty() && !name.contains('/'))
  }

  /// Walks every schema in the document and fails on the first pointer that
  /// does not name an existing component.
  pub(crate) fn verify_document(&self, document: &ApiDocument) -> Result<(), GenerationError> {
    for (name, component) in &document.components {
      self.verify_node(&component.node, &format!("{SCHEMA_REF_PREFIX}{name}"))?;
    }

    for (item, operation) in document.operations() {
      let location = format!("{} {}", operation.verb, operation.path);
      for param in item.parameters.iter().chain(&operation.parameters) {
        self.verify_node(&param.schema, &format!("{location} parameter '{}'", param.name))?;
      }
      if let Some(body) = &operation.request_body {
        for (media_type, node) in &body.content {
          self.verify_node(node, &format!("{location} request body {media_type}"))?;
        }
      }
      for (status, response) in &operation.responses {
        for (media_type, node) in &response.content {
          self.verify_node(node, &format!("{location} response {status} {media_type}"))?;
        }
      }
    }

    Ok(())
  }

  fn verify_node(&self, node: &SchemaNode, location: &str) -> Result<(), GenerationError> {
    match node {
      SchemaNode::Reference(pointer) => self.verify_pointer(pointer, location),
      SchemaNode::Array(item) => self.verify_node(item, &format!("{location}/items")),
      SchemaNode::Object(shape) => self.verify_shape(shape, location),
      SchemaNode::Composite { parent, extra } => {
        self.verify_pointer(parent, &format!("{location}/allOf"))?;
        self.verify_shape(extra, location)
      }
      SchemaNode::Primitive(_) | SchemaNode::Untyped | SchemaNode::Unsupported(_) => Ok(()),
    }
  }

  fn verify_shape(&self, shape: &ObjectShape, location: &str) -> Result<(), GenerationError> {
    shape
      .properties
      .iter()
      .try_for_each(|(name, node)| self.verify_node(node, &format!("{location}/properties/{name}")))
  }

  fn verify_pointer(&self, pointer: &str, location: &str) -> Result<(), GenerationError> {
    self
      .resolve(pointer)
      .map(|_| ())
      .map_err(|_| GenerationError::unresolved(pointer, location))
  }
}
