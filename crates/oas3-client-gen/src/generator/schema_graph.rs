//! In-memory model of an API document after lowering.
//!
//! Everything here is plain data. Maps keep declaration order so that models,
//! fields and methods come out in the order the document author wrote them.

use std::collections::BTreeSet;

use http::Method;
use indexmap::IndexMap;
use strum::Display;

pub(crate) const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveKind {
  String,
  Integer,
  Number,
  Boolean,
}

/// Properties of an object schema, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
  pub properties: IndexMap<String, SchemaNode>,
  pub required: BTreeSet<String>,
}

impl ObjectShape {
  pub fn is_required(&self, name: &str) -> bool {
    self.required.contains(name)
  }

  /// Appends another block's properties. A property declared again keeps its
  /// original position and takes the later schema.
  pub fn merge(&mut self, other: ObjectShape) {
    self.properties.extend(other.properties);
    self.required.extend(other.required);
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
  Primitive(PrimitiveKind),
  Array(Box<SchemaNode>),
  Object(ObjectShape),
  Reference(String),
  /// `allOf` with one parent reference plus merged inline properties.
  Composite {
    parent: String,
    extra: ObjectShape,
  },
  /// No `type` keyword and nothing else to go on.
  Untyped,
  /// A shape the generator does not model (unions, unknown types).
  Unsupported(String),
}

impl SchemaNode {
  pub fn reference(name: &str) -> Self {
    Self::Reference(format!("{SCHEMA_REF_PREFIX}{name}"))
  }

  pub fn is_composite(&self) -> bool {
    matches!(self, Self::Composite { .. })
  }

  /// The property block a model is built from, if the node has one.
  pub fn object_shape(&self) -> Option<&ObjectShape> {
    match self {
      Self::Object(shape) | Self::Composite { extra: shape, .. } => Some(shape),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
  pub name: String,
  pub node: SchemaNode,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ParameterLocation {
  Path,
  Query,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
  pub name: String,
  pub location: ParameterLocation,
  pub schema: SchemaNode,
  pub required: bool,
  pub description: Option<String>,
}

/// Request body media types in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
  pub content: IndexMap<String, SchemaNode>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
  pub content: IndexMap<String, SchemaNode>,
}

/// Scheme names that must all be satisfied together.
pub type SecurityRequirement = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecuritySchemeKind {
  Bearer,
  ApiKey,
  Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
  pub path: String,
  pub verb: Method,
  pub operation_id: String,
  pub summary: Option<String>,
  pub description: Option<String>,
  pub parameters: Vec<Parameter>,
  pub request_body: Option<RequestBody>,
  pub responses: IndexMap<String, Response>,
  /// `None` when the operation does not mention security at all.
  pub security: Option<Vec<SecurityRequirement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathItem {
  pub path: String,
  pub parameters: Vec<Parameter>,
  pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
  pub title: String,
  pub version: String,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiDocument {
  pub info: DocumentInfo,
  pub components: IndexMap<String, Component>,
  pub paths: Vec<PathItem>,
  pub security_schemes: IndexMap<String, SecuritySchemeKind>,
  pub security: Option<Vec<SecurityRequirement>>,
}

impl ApiDocument {
  pub fn operations(&self) -> impl Iterator<Item = (&PathItem, &Operation)> {
    self
      .paths
      .iter()
      .flat_map(|item| item.operations.iter().map(move |operation| (item, operation)))
  }
}
