use std::collections::BTreeSet;

use indexmap::IndexMap;
use mediatype::MediaType;

use crate::generator::{
  ast::{
    BodyEncoding, Documentation, GeneratedMethod, ParamRole, PathTemplate, RustPrimitive, SecurityHeader,
    SignatureParam, TypeRef,
  },
  metrics::GenerationWarning,
  naming::identifiers::{ensure_unique, to_rust_field_name},
  schema_graph::{Operation, Parameter, ParameterLocation, PathItem, SecurityRequirement, SecuritySchemeKind},
  type_mapper::TypeMapper,
};

/// Locals the emitted method body declares.
const RESERVED_LOCALS: [&str; 7] = ["request", "response", "url", "query", "status", "text", "api_key"];

const SUCCESS_STATUSES: [&str; 2] = ["200", "201"];

/// How shared path-item parameters combine with operation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterMerge {
  /// Every declaration becomes a signature parameter, duplicates included.
  #[default]
  KeepAll,
  /// One parameter per (name, location); the later declaration replaces the
  /// earlier one.
  LastWins,
}

/// Whether query parameters honour their declared `required` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryParams {
  #[default]
  AlwaysOptional,
  RespectRequired,
}

pub(crate) struct SynthesizedMethod {
  pub(crate) method: Option<GeneratedMethod>,
  pub(crate) warnings: Vec<GenerationWarning>,
}

pub(crate) struct OperationSynthesizer<'a> {
  mapper: &'a TypeMapper<'a>,
  security_schemes: &'a IndexMap<String, SecuritySchemeKind>,
  default_security: Option<&'a [SecurityRequirement]>,
  parameter_merge: ParameterMerge,
  query_params: QueryParams,
}

impl<'a> OperationSynthesizer<'a> {
  pub(crate) fn new(
    mapper: &'a TypeMapper<'a>,
    security_schemes: &'a IndexMap<String, SecuritySchemeKind>,
    default_security: Option<&'a [SecurityRequirement]>,
  ) -> Self {
    Self {
      mapper,
      security_schemes,
      default_security,
      parameter_merge: ParameterMerge::default(),
      query_params: QueryParams::default(),
    }
  }

  pub(crate) fn with_policies(mut self, parameter_merge: ParameterMerge, query_params: QueryParams) -> Self {
    self.parameter_merge = parameter_merge;
    self.query_params = query_params;
    self
  }

  pub(crate) fn synthesize(&self, item: &PathItem, operation: &Operation) -> SynthesizedMethod {
    let mut warnings = vec![];
    let operation_id = operation.operation_id.as_str();

    let template = match PathTemplate::parse(&operation.path) {
      Ok(template) => template,
      Err(err) => {
        warnings.push(GenerationWarning::OperationSkipped {
          operation: operation_id.to_string(),
          reason: err.to_string(),
        });
        return SynthesizedMethod { method: None, warnings };
      }
    };

    let mut used_idents: BTreeSet<String> = RESERVED_LOCALS.iter().map(ToString::to_string).collect();
    let mut signature_params = vec![];
    let mut query_param_names = vec![];

    for param in self.merge_parameters(&item.parameters, &operation.parameters) {
      let ident = unique_ident(&param.name, &mut used_idents);
      let type_ref = self.mapper.map(&param.schema);

      let (role, optional) = match param.location {
        ParameterLocation::Path => {
          if !template.has_placeholder(&param.name) {
            warnings.push(GenerationWarning::malformed(
              operation_id,
              format!("path parameter '{}' has no placeholder in '{}'", param.name, operation.path),
            ));
          }
          (ParamRole::Path, !param.required)
        }
        ParameterLocation::Query => {
          query_param_names.push(param.name.clone());
          let optional = match self.query_params {
            QueryParams::AlwaysOptional => true,
            QueryParams::RespectRequired => !param.required,
          };
          (ParamRole::Query, optional)
        }
      };

      signature_params.push(
        SignatureParam::builder()
          .name(param.name.clone())
          .ident(ident)
          .type_ref(type_ref)
          .optional(optional)
          .default_null(optional)
          .role(role)
          .build(),
      );
    }

    let undeclared: Vec<String> = template
      .placeholders()
      .filter(|placeholder| {
        !signature_params
          .iter()
          .any(|p| p.role == ParamRole::Path && p.name == *placeholder)
      })
      .map(String::from)
      .collect();
    for placeholder in undeclared {
      warnings.push(GenerationWarning::malformed(
        operation_id,
        format!("placeholder '{{{placeholder}}}' has no declared path parameter; added as a string"),
      ));
      signature_params.push(
        SignatureParam::builder()
          .ident(unique_ident(&placeholder, &mut used_idents))
          .name(placeholder)
          .type_ref(RustPrimitive::String.into())
          .role(ParamRole::Path)
          .build(),
      );
    }

    if let Some(body) = &operation.request_body {
      match body.content.first() {
        Some((content_type, schema)) => signature_params.push(
          SignatureParam::builder()
            .name("body")
            .ident(unique_ident("body", &mut used_idents))
            .type_ref(self.mapper.map(schema))
            .role(ParamRole::Body(body_encoding(content_type)))
            .build(),
        ),
        None => warnings.push(GenerationWarning::malformed(
          operation_id,
          "request body declares no content types; body parameter omitted",
        )),
      }
    }

    let method = GeneratedMethod::builder()
      .name(to_rust_field_name(operation_id))
      .operation_id(operation_id)
      .verb(operation.verb.clone())
      .signature_params(signature_params)
      .return_type(self.return_type(operation))
      .path_template(template)
      .query_param_names(query_param_names)
      .security(self.security_headers(operation))
      .docs(method_docs(operation))
      .build();

    SynthesizedMethod {
      method: Some(method),
      warnings,
    }
  }

  /// Shared parameters first, then the operation's own.
  pub(crate) fn merge_parameters<'p>(&self, shared: &'p [Parameter], own: &'p [Parameter]) -> Vec<&'p Parameter> {
    let all: Vec<&Parameter> = shared.iter().chain(own).collect();
    match self.parameter_merge {
      ParameterMerge::KeepAll => all,
      ParameterMerge::LastWins => all
        .iter()
        .enumerate()
        .filter(|(index, param)| {
          !all[index + 1..]
            .iter()
            .any(|later| later.name == param.name && later.location == param.location)
        })
        .map(|(_, param)| *param)
        .collect(),
    }
  }

  fn return_type(&self, operation: &Operation) -> TypeRef {
    let Some(response) = SUCCESS_STATUSES
      .iter()
      .find_map(|status| operation.responses.get(*status))
    else {
      return TypeRef::Dynamic;
    };

    response
      .content
      .iter()
      .find(|(content_type, _)| is_json(content_type))
      .map_or(TypeRef::Dynamic, |(_, schema)| self.mapper.map(schema))
  }

  fn security_headers(&self, operation: &Operation) -> Vec<SecurityHeader> {
    let requirements = operation.security.as_deref().or(self.default_security).unwrap_or_default();

    let mut headers = vec![];
    for scheme in requirements.iter().flatten() {
      let header = match self.security_schemes.get(scheme) {
        Some(SecuritySchemeKind::Bearer) => SecurityHeader::Bearer,
        Some(SecuritySchemeKind::ApiKey) => SecurityHeader::ApiKey,
        Some(SecuritySchemeKind::Unsupported(_)) | None => continue,
      };
      if !headers.contains(&header) {
        headers.push(header);
      }
    }
    headers
  }
}

fn unique_ident(name: &str, used: &mut BTreeSet<String>) -> String {
  let ident = ensure_unique(&to_rust_field_name(name), used);
  used.insert(ident.clone());
  ident
}

/// `application/json` with any parameters, nothing else.
fn is_json(content_type: &str) -> bool {
  MediaType::parse(content_type)
    .is_ok_and(|media| media.ty.as_str() == "application" && media.subty.as_str() == "json" && media.suffix.is_none())
}

fn body_encoding(content_type: &str) -> BodyEncoding {
  match MediaType::parse(content_type) {
    Ok(media) if media.ty.as_str() == "application" && media.subty.as_str() == "x-www-form-urlencoded" => {
      BodyEncoding::Form
    }
    _ => BodyEncoding::Json,
  }
}

fn method_docs(operation: &Operation) -> Documentation {
  let mut docs = Documentation::from_optional(operation.summary.as_deref());
  if let Some(description) = &operation.description {
    docs.push_paragraph(description);
  }
  if !docs.is_empty() {
    docs.push("");
  }
  docs.push(format!("`{} {}`", operation.verb, operation.path));
  docs
}

#[cfg(test)]
mod tests {
  use serde_json::{Value, json};

  use super::*;
  use crate::generator::{
    lowering::DocumentLowering,
    resolver::ReferenceResolver,
    schema_graph::ApiDocument,
    type_mapper::{SCAFFOLD_TYPE_NAMES, assign_model_names},
  };

  fn synthesize_all(value: &Value, merge: ParameterMerge, query: QueryParams) -> Vec<SynthesizedMethod> {
    let document: ApiDocument = DocumentLowering::lower(value).unwrap().document;
    let resolver = ReferenceResolver::new(&document.components);
    let names = assign_model_names(&document.components, &SCAFFOLD_TYPE_NAMES);
    let mapper = TypeMapper::new(&resolver, &names);
    let synthesizer = OperationSynthesizer::new(&mapper, &document.security_schemes, document.security.as_deref())
      .with_policies(merge, query);

    document
      .operations()
      .map(|(item, operation)| synthesizer.synthesize(item, operation))
      .collect()
  }

  fn synthesize_one(value: &Value) -> SynthesizedMethod {
    synthesize_all(value, ParameterMerge::default(), QueryParams::default())
      .into_iter()
      .next()
      .unwrap()
  }

  #[test]
  fn test_path_parameter_is_required_and_templated() {
    let synthesized = synthesize_one(&json!({ "paths": { "/items/{id}": { "get": {
      "operationId": "getItem",
      "parameters": [ { "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } } ],
      "responses": {}
    }}}}));
    let method = synthesized.method.unwrap();

    assert!(method.path_template.as_str().contains("{id}"));
    let id = method.param("id").unwrap();
    assert!(!id.optional);
    assert_eq!(id.role, ParamRole::Path);
    assert_eq!(id.type_ref, TypeRef::Primitive(RustPrimitive::I64));
    assert_eq!(method.name, "get_item");
    assert_eq!(method.operation_id, "getItem");
    assert!(synthesized.warnings.is_empty());
  }

  #[test]
  fn test_query_parameters_always_optional_by_default() {
    let doc = json!({ "paths": { "/pets": { "get": {
      "parameters": [
        { "name": "limit", "in": "query", "required": true, "schema": { "type": "integer" } },
        { "name": "tag", "in": "query", "schema": { "type": "string" } }
      ],
      "responses": {}
    }}}});

    let method = synthesize_one(&doc).method.unwrap();
    assert_eq!(method.query_param_names, vec!["limit", "tag"]);
    for param in method.query_params() {
      assert!(param.optional);
      assert!(param.default_null);
    }

    let method = synthesize_all(&doc, ParameterMerge::KeepAll, QueryParams::RespectRequired)
      .remove(0)
      .method
      .unwrap();
    assert!(!method.param("limit").unwrap().optional);
    assert!(method.param("tag").unwrap().optional);
  }

  #[test]
  fn test_shared_parameters_merge_ahead_and_keep_duplicates() {
    let doc = json!({ "paths": { "/pets/{id}": {
      "parameters": [
        { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } },
        { "name": "verbose", "in": "query", "schema": { "type": "boolean" } }
      ],
      "get": {
        "parameters": [
          { "name": "verbose", "in": "query", "schema": { "type": "string" } },
          { "name": "fields", "in": "query", "schema": { "type": "string" } }
        ],
        "responses": {}
      }
    }}});

    let method = synthesize_one(&doc).method.unwrap();
    let idents: Vec<_> = method.signature_params.iter().map(|p| p.ident.as_str()).collect();
    assert_eq!(idents, vec!["id", "verbose", "verbose2", "fields"]);
    assert_eq!(method.query_param_names, vec!["verbose", "verbose", "fields"]);

    let method = synthesize_all(&doc, ParameterMerge::LastWins, QueryParams::AlwaysOptional)
      .remove(0)
      .method
      .unwrap();
    let names: Vec<_> = method.signature_params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["id", "verbose", "fields"]);
    assert_eq!(
      method.param("verbose").unwrap().type_ref,
      TypeRef::Primitive(RustPrimitive::String)
    );
  }

  #[test]
  fn test_request_body_uses_first_content_type() {
    let method = synthesize_one(&json!({ "paths": { "/pets": { "post": {
      "parameters": [ { "name": "dryRun", "in": "query", "schema": { "type": "boolean" } } ],
      "requestBody": { "content": {
        "application/x-www-form-urlencoded": { "schema": { "type": "object" } },
        "application/json": { "schema": { "type": "string" } }
      }},
      "responses": {}
    }}}}))
    .method
    .unwrap();

    let body = method.body().unwrap();
    assert_eq!(body.ident, "body");
    assert_eq!(body.role, ParamRole::Body(BodyEncoding::Form));
    assert_eq!(body.type_ref, TypeRef::Map);
    assert!(!body.optional);
    assert_eq!(method.signature_params.last().unwrap().name, "body");
  }

  #[test]
  fn test_request_body_without_content_is_malformed() {
    let synthesized = synthesize_one(&json!({ "paths": { "/pets": { "post": {
      "operationId": "createPet",
      "requestBody": { "content": {} },
      "responses": {}
    }}}}));

    assert!(synthesized.method.unwrap().body().is_none());
    assert!(matches!(
      &synthesized.warnings[0],
      GenerationWarning::MalformedOperation { operation, .. } if operation == "createPet"
    ));
  }

  #[test]
  fn test_return_type_prefers_200_then_201() {
    let doc = json!({
      "components": { "schemas": { "Pet": { "type": "object" } } },
      "paths": {
        "/a": { "get": { "responses": {
          "201": { "content": { "application/json": { "schema": { "type": "string" } } } },
          "200": { "content": { "application/json; charset=utf-8": { "schema": { "$ref": "#/components/schemas/Pet" } } } }
        }}},
        "/b": { "post": { "responses": {
          "201": { "content": { "application/json": { "schema": { "type": "array", "items": { "type": "integer" } } } } }
        }}},
        "/c": { "get": { "responses": {
          "200": { "content": { "text/plain": { "schema": { "type": "string" } } } },
          "201": { "content": { "application/json": { "schema": { "type": "string" } } } }
        }}},
        "/d": { "delete": { "responses": { "204": { "description": "gone" } } } }
      }
    });

    let methods: Vec<_> = synthesize_all(&doc, ParameterMerge::default(), QueryParams::default())
      .into_iter()
      .map(|s| s.method.unwrap())
      .collect();
    assert_eq!(methods[0].return_type, TypeRef::named("Pet"));
    assert_eq!(methods[1].return_type.to_rust_type(), "Vec<i64>");
    assert_eq!(methods[2].return_type, TypeRef::Dynamic);
    assert_eq!(methods[3].return_type, TypeRef::Dynamic);
  }

  #[test]
  fn test_undeclared_placeholder_is_synthesized() {
    let synthesized = synthesize_one(&json!({ "paths": { "/stores/{storeId}/items": { "get": {
      "operationId": "listItems",
      "responses": {}
    }}}}));

    let method = synthesized.method.unwrap();
    let store = method.param("storeId").unwrap();
    assert_eq!(store.ident, "store_id");
    assert!(!store.optional);
    assert_eq!(store.type_ref, TypeRef::Primitive(RustPrimitive::String));
    assert_eq!(synthesized.warnings.len(), 1);
  }

  #[test]
  fn test_path_parameter_without_placeholder_warns() {
    let synthesized = synthesize_one(&json!({ "paths": { "/pets": { "get": {
      "operationId": "listPets",
      "parameters": [ { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } } ],
      "responses": {}
    }}}}));

    let method = synthesized.method.unwrap();
    assert!(method.param("id").is_some());
    assert!(matches!(
      &synthesized.warnings[0],
      GenerationWarning::MalformedOperation { detail, .. } if detail.contains("'id'")
    ));
  }

  #[test]
  fn test_malformed_template_skips_method() {
    let synthesized = synthesize_one(&json!({ "paths": { "/pets/{id": { "get": {
      "operationId": "broken",
      "responses": {}
    }}}}));

    assert!(synthesized.method.is_none());
    assert!(synthesized.warnings[0].is_skipped_item());
  }

  #[test]
  fn test_security_headers() {
    let doc = json!({
      "components": { "securitySchemes": {
        "bearerAuth": { "type": "http", "scheme": "bearer" },
        "apiKeyAuth": { "type": "apiKey", "in": "header", "name": "X-API-Key" },
        "oauth": { "type": "oauth2", "flows": {} }
      }},
      "paths": {
        "/secure": { "get": { "security": [ { "bearerAuth": [] } ], "responses": {} } },
        "/open": { "get": { "responses": {} } },
        "/both": { "get": {
          "security": [ { "bearerAuth": [], "oauth": [] }, { "apiKeyAuth": [] }, { "bearerAuth": [] }, { "unknown": [] } ],
          "responses": {}
        }}
      }
    });

    let methods: Vec<_> = synthesize_all(&doc, ParameterMerge::default(), QueryParams::default())
      .into_iter()
      .map(|s| s.method.unwrap())
      .collect();
    assert_eq!(methods[0].security, vec![SecurityHeader::Bearer]);
    assert!(methods[1].security.is_empty());
    assert_eq!(methods[2].security, vec![SecurityHeader::Bearer, SecurityHeader::ApiKey]);
  }

  #[test]
  fn test_document_security_applies_unless_overridden() {
    let doc = json!({
      "security": [ { "apiKeyAuth": [] } ],
      "components": { "securitySchemes": { "apiKeyAuth": { "type": "apiKey", "in": "header", "name": "X-API-Key" } } },
      "paths": {
        "/inherit": { "get": { "responses": {} } },
        "/public": { "get": { "security": [], "responses": {} } }
      }
    });

    let methods: Vec<_> = synthesize_all(&doc, ParameterMerge::default(), QueryParams::default())
      .into_iter()
      .map(|s| s.method.unwrap())
      .collect();
    assert_eq!(methods[0].security, vec![SecurityHeader::ApiKey]);
    assert!(methods[1].security.is_empty());
  }

  #[test]
  fn test_reserved_locals_are_not_shadowed() {
    let method = synthesize_one(&json!({ "paths": { "/search": { "post": {
      "parameters": [
        { "name": "url", "in": "query", "schema": { "type": "string" } },
        { "name": "body", "in": "query", "schema": { "type": "string" } },
        { "name": "type", "in": "query", "schema": { "type": "string" } }
      ],
      "requestBody": { "content": { "application/json": { "schema": { "type": "object" } } } },
      "responses": {}
    }}}}))
    .method
    .unwrap();

    let idents: Vec<_> = method.signature_params.iter().map(|p| p.ident.as_str()).collect();
    assert_eq!(idents, vec!["url2", "body", "r#type", "body2"]);
  }

  #[test]
  fn test_docs_include_summary_and_route() {
    let method = synthesize_one(&json!({ "paths": { "/pets": { "get": {
      "summary": "List pets",
      "description": "Returns every pet.",
      "responses": {}
    }}}}))
    .method
    .unwrap();

    assert_eq!(
      method.docs.lines(),
      &["List pets", "", "Returns every pet.", "", "`GET /pets`"]
    );
    assert_eq!(method.name, "get_pets");
  }
}
