mod documentation;
mod parsed_path;
mod types;

#[cfg(test)]
mod tests;

pub use documentation::Documentation;
use http::Method;
pub use parsed_path::{PathParseError, PathTemplate, TemplatePart};
pub use types::{RustPrimitive, TypeRef};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModelKind {
  #[default]
  Struct,
  /// `type Name = Target;`
  Alias(TypeRef),
}

#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct ModelField {
  /// JSON property name as declared.
  #[builder(into)]
  pub name: String,
  pub type_ref: TypeRef,
  #[builder(default)]
  pub optional: bool,
  /// Wrapped in `Box` to break a reference cycle.
  #[builder(default)]
  pub boxed: bool,
}

/// One emitted data model.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct GeneratedModel {
  #[builder(into)]
  pub name: String,
  /// Rust name of the inherited model, if any.
  pub parent_name: Option<String>,
  #[builder(default)]
  pub fields: Vec<ModelField>,
  #[builder(default, into)]
  pub doc_comment: String,
  #[builder(default)]
  pub kind: ModelKind,
}

impl GeneratedModel {
  pub fn field(&self, name: &str) -> Option<&ModelField> {
    self.fields.iter().find(|f| f.name == name)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyEncoding {
  Json,
  Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamRole {
  Path,
  Query,
  Body(BodyEncoding),
}

#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct SignatureParam {
  /// Name as declared in the document (or `body`).
  #[builder(into)]
  pub name: String,
  /// Rust identifier, unique within the method.
  #[builder(into)]
  pub ident: String,
  pub type_ref: TypeRef,
  #[builder(default)]
  pub optional: bool,
  /// Callers may pass `None`.
  #[builder(default)]
  pub default_null: bool,
  pub role: ParamRole,
}

/// A header the client attaches when an API key is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityHeader {
  Bearer,
  ApiKey,
}

impl SecurityHeader {
  pub fn header_name(self) -> &'static str {
    match self {
      Self::Bearer => "Authorization",
      Self::ApiKey => "X-API-Key",
    }
  }
}

/// One emitted client method.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct GeneratedMethod {
  #[builder(into)]
  pub name: String,
  #[builder(into)]
  pub operation_id: String,
  pub verb: Method,
  #[builder(default)]
  pub signature_params: Vec<SignatureParam>,
  pub return_type: TypeRef,
  pub path_template: PathTemplate,
  #[builder(default)]
  pub query_param_names: Vec<String>,
  #[builder(default)]
  pub security: Vec<SecurityHeader>,
  #[builder(default)]
  pub docs: Documentation,
}

impl GeneratedMethod {
  pub fn body(&self) -> Option<&SignatureParam> {
    self
      .signature_params
      .iter()
      .find(|p| matches!(p.role, ParamRole::Body(_)))
  }

  pub fn path_params(&self) -> impl Iterator<Item = &SignatureParam> {
    self.signature_params.iter().filter(|p| p.role == ParamRole::Path)
  }

  pub fn query_params(&self) -> impl Iterator<Item = &SignatureParam> {
    self.signature_params.iter().filter(|p| p.role == ParamRole::Query)
  }

  pub fn param(&self, name: &str) -> Option<&SignatureParam> {
    self.signature_params.iter().find(|p| p.name == name)
  }

  /// The parameter that fills the placeholder `name`: the first path
  /// parameter declared with that name.
  pub fn placeholder_param(&self, name: &str) -> Option<&SignatureParam> {
    self.path_params().find(|p| p.name == name)
  }
}
