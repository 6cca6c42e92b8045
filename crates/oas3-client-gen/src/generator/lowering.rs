//! Lowers a parsed document into the [`ApiDocument`] model.
//!
//! The `oas3` typed model keeps its maps sorted, which loses the order the
//! author declared schemas, properties and paths in. Lowering therefore walks
//! the raw `serde_json::Value` (built with `preserve_order`). The input is
//! expected to have passed validation already, so missing pieces fall back to
//! defaults instead of failing.

use std::collections::BTreeSet;

use http::Method;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::generator::{
  error::GenerationError,
  metrics::GenerationWarning,
  schema_graph::{
    ApiDocument, Component, DocumentInfo, ObjectShape, Operation, Parameter, ParameterLocation, PathItem,
    PrimitiveKind, RequestBody, Response, SchemaNode, SecurityRequirement, SecuritySchemeKind,
  },
};

const SUPPORTED_VERBS: [(&str, Method); 5] = [
  ("get", Method::GET),
  ("post", Method::POST),
  ("put", Method::PUT),
  ("delete", Method::DELETE),
  ("patch", Method::PATCH),
];

/// Builds the fallback identifier for operations without an `operationId`.
pub(crate) fn fallback_operation_id(verb: &Method, path: &str) -> String {
  format!("{}_{}", verb.as_str().to_ascii_lowercase(), path.replace('/', "_"))
}

pub(crate) struct LoweredDocument {
  pub(crate) document: ApiDocument,
  pub(crate) warnings: Vec<GenerationWarning>,
}

pub(crate) struct DocumentLowering<'a> {
  root: &'a Value,
  warnings: Vec<GenerationWarning>,
}

impl<'a> DocumentLowering<'a> {
  pub(crate) fn lower(root: &'a Value) -> Result<LoweredDocument, GenerationError> {
    let mut lowering = Self { root, warnings: vec![] };

    let root_map = root
      .as_object()
      .ok_or_else(|| GenerationError::invalid("document root must be an object"))?;

    let info = Self::info(root_map.get("info"));
    let components = lowering.components()?;
    let security_schemes = lowering.security_schemes();
    let security = root_map.get("security").map(Self::security_requirements);
    let paths = lowering.paths()?;

    Ok(LoweredDocument {
      document: ApiDocument {
        info,
        components,
        paths,
        security_schemes,
        security,
      },
      warnings: lowering.warnings,
    })
  }

  fn info(value: Option<&Value>) -> DocumentInfo {
    let field = |key: &str| value.and_then(|v| v.get(key)).and_then(Value::as_str).map(String::from);
    DocumentInfo {
      title: field("title").unwrap_or_else(|| "API".to_string()),
      version: field("version").unwrap_or_else(|| "1.0.0".to_string()),
      description: field("description"),
    }
  }

  fn section(&self, key: &str) -> Option<&'a Map<String, Value>> {
    self
      .root
      .get("components")
      .and_then(|c| c.get(key))
      .and_then(Value::as_object)
  }

  fn components(&mut self) -> Result<IndexMap<String, Component>, GenerationError> {
    let mut components = IndexMap::new();
    let Some(schemas) = self.section("schemas") else {
      return Ok(components);
    };

    for (name, schema) in schemas {
      let location = format!("#/components/schemas/{name}");
      let node = self.schema(schema, &location, Some(name));
      components.insert(
        name.clone(),
        Component {
          name: name.clone(),
          node,
          description: description(schema),
        },
      );
    }

    Ok(components)
  }

  fn security_schemes(&self) -> IndexMap<String, SecuritySchemeKind> {
    let Some(schemes) = self.section("securitySchemes") else {
      return IndexMap::new();
    };

    schemes
      .iter()
      .map(|(name, scheme)| (name.clone(), Self::security_scheme_kind(scheme)))
      .collect()
  }

  fn security_scheme_kind(scheme: &Value) -> SecuritySchemeKind {
    let kind = scheme.get("type").and_then(Value::as_str).unwrap_or_default();
    let http_scheme = scheme.get("scheme").and_then(Value::as_str).unwrap_or_default();

    match kind {
      "http" if http_scheme.eq_ignore_ascii_case("bearer") => SecuritySchemeKind::Bearer,
      "apiKey" => SecuritySchemeKind::ApiKey,
      "http" => SecuritySchemeKind::Unsupported(format!("http {http_scheme}")),
      other => SecuritySchemeKind::Unsupported(other.to_string()),
    }
  }

  fn security_requirements(value: &Value) -> Vec<SecurityRequirement> {
    value
      .as_array()
      .map(|requirements| {
        requirements
          .iter()
          .filter_map(Value::as_object)
          .map(|requirement| requirement.keys().cloned().collect())
          .collect()
      })
      .unwrap_or_default()
  }

  fn paths(&mut self) -> Result<Vec<PathItem>, GenerationError> {
    let Some(paths) = self.root.get("paths") else {
      return Ok(vec![]);
    };
    let paths = paths
      .as_object()
      .ok_or_else(|| GenerationError::invalid("'paths' must be an object"))?;

    let mut items = Vec::with_capacity(paths.len());
    for (path, item) in paths {
      let item = self.resolve_local(item, &format!("#/paths/{path}"))?;
      let item_map = item
        .as_object()
        .ok_or_else(|| GenerationError::invalid(format!("path item '{path}' must be an object")))?;

      let parameters = self.parameters(item_map.get("parameters"), path)?;

      let mut operations = vec![];
      for (key, operation) in item_map {
        let Some((_, verb)) = SUPPORTED_VERBS.iter().find(|(name, _)| key.eq_ignore_ascii_case(name)) else {
          continue;
        };
        operations.push(self.operation(path, verb.clone(), operation)?);
      }

      items.push(PathItem {
        path: path.clone(),
        parameters,
        operations,
      });
    }

    Ok(items)
  }

  fn operation(&mut self, path: &str, verb: Method, value: &Value) -> Result<Operation, GenerationError> {
    let operation_id = value
      .get("operationId")
      .and_then(Value::as_str)
      .map_or_else(|| fallback_operation_id(&verb, path), String::from);

    let parameters = self.parameters(value.get("parameters"), &operation_id)?;
    let request_body = value
      .get("requestBody")
      .map(|body| self.request_body(body, &operation_id))
      .transpose()?;
    let responses = self.responses(value.get("responses"), &operation_id)?;

    Ok(Operation {
      path: path.to_string(),
      verb,
      summary: value.get("summary").and_then(Value::as_str).map(String::from),
      description: description(value),
      parameters,
      request_body,
      responses,
      security: value.get("security").map(Self::security_requirements),
      operation_id,
    })
  }

  fn parameters(&mut self, value: Option<&Value>, owner: &str) -> Result<Vec<Parameter>, GenerationError> {
    let Some(list) = value.and_then(Value::as_array) else {
      return Ok(vec![]);
    };

    let mut parameters = Vec::with_capacity(list.len());
    for (index, raw) in list.iter().enumerate() {
      let location = format!("{owner}/parameters/{index}");
      let param = self.resolve_local(raw, &location)?;

      let Some(name) = param.get("name").and_then(Value::as_str) else {
        self
          .warnings
          .push(GenerationWarning::malformed(owner, format!("parameter #{index} has no name")));
        continue;
      };

      let placement = param.get("in").and_then(Value::as_str).unwrap_or_default();
      let location_kind = match placement {
        "path" => ParameterLocation::Path,
        "query" => ParameterLocation::Query,
        other => {
          self.warnings.push(GenerationWarning::IgnoredParameter {
            operation: owner.to_string(),
            name: name.to_string(),
            location: other.to_string(),
          });
          continue;
        }
      };

      let schema = param
        .get("schema")
        .or_else(|| first_media_schema(param.get("content")))
        .map_or(SchemaNode::Untyped, |schema| self.schema(schema, &location, None));

      parameters.push(Parameter {
        name: name.to_string(),
        location: location_kind,
        schema,
        required: param.get("required").and_then(Value::as_bool).unwrap_or(false),
        description: description(param),
      });
    }

    Ok(parameters)
  }

  fn request_body(&mut self, value: &Value, owner: &str) -> Result<RequestBody, GenerationError> {
    let location = format!("{owner}/requestBody");
    let body = self.resolve_local(value, &location)?;
    Ok(RequestBody {
      content: self.content(body.get("content"), &location),
      description: description(body),
    })
  }

  fn responses(&mut self, value: Option<&Value>, owner: &str) -> Result<IndexMap<String, Response>, GenerationError> {
    let Some(responses) = value.and_then(Value::as_object) else {
      return Ok(IndexMap::new());
    };

    let mut lowered = IndexMap::with_capacity(responses.len());
    for (status, response) in responses {
      let location = format!("{owner}/responses/{status}");
      let response = self.resolve_local(response, &location)?;
      lowered.insert(
        status.clone(),
        Response {
          content: self.content(response.get("content"), &location),
        },
      );
    }

    Ok(lowered)
  }

  fn content(&mut self, value: Option<&Value>, location: &str) -> IndexMap<String, SchemaNode> {
    let Some(content) = value.and_then(Value::as_object) else {
      return IndexMap::new();
    };

    content
      .iter()
      .map(|(media_type, media)| {
        let node = media.get("schema").map_or(SchemaNode::Untyped, |schema| {
          self.schema(schema, &format!("{location}/content/{media_type}"), None)
        });
        (media_type.clone(), node)
      })
      .collect()
  }

  /// Follows a local `$ref` for non-schema objects (parameters, bodies,
  /// responses, path items).
  fn resolve_local(&self, value: &'a Value, location: &str) -> Result<&'a Value, GenerationError> {
    let Some(pointer) = value.get("$ref").and_then(Value::as_str) else {
      return Ok(value);
    };

    pointer
      .strip_prefix('#')
      .and_then(|fragment| self.root.pointer(fragment))
      .ok_or_else(|| GenerationError::unresolved(pointer, location))
  }

  fn schema(&mut self, value: &Value, location: &str, component: Option<&str>) -> SchemaNode {
    let Some(map) = value.as_object() else {
      return SchemaNode::Untyped;
    };

    if let Some(pointer) = map.get("$ref").and_then(Value::as_str) {
      return SchemaNode::Reference(pointer.to_string());
    }

    if let Some(all_of) = map.get("allOf").and_then(Value::as_array)
      && !all_of.is_empty()
    {
      return self.all_of(map, all_of, location, component);
    }

    for keyword in ["oneOf", "anyOf"] {
      if map.get(keyword).and_then(Value::as_array).is_some_and(|v| !v.is_empty()) {
        return self.unsupported(location, format!("{keyword} unions are not modeled"));
      }
    }

    match map.get("type") {
      Some(Value::String(kind)) => self.typed_schema(kind, map, location),
      Some(Value::Array(kinds)) => {
        let non_null: Vec<&str> = kinds.iter().filter_map(Value::as_str).filter(|k| *k != "null").collect();
        match non_null.as_slice() {
          [kind] => self.typed_schema(kind, map, location),
          _ => self.unsupported(location, format!("type list {}", Value::Array(kinds.clone()))),
        }
      }
      Some(other) => self.unsupported(location, format!("type keyword {other}")),
      None if map.contains_key("properties") => SchemaNode::Object(self.object_shape(map, location)),
      None if map.contains_key("items") => self.array(map, location),
      None => SchemaNode::Untyped,
    }
  }

  fn typed_schema(&mut self, kind: &str, map: &Map<String, Value>, location: &str) -> SchemaNode {
    match kind {
      "string" => SchemaNode::Primitive(PrimitiveKind::String),
      "integer" => SchemaNode::Primitive(PrimitiveKind::Integer),
      "number" => SchemaNode::Primitive(PrimitiveKind::Number),
      "boolean" => SchemaNode::Primitive(PrimitiveKind::Boolean),
      "array" => self.array(map, location),
      "object" => SchemaNode::Object(self.object_shape(map, location)),
      other => self.unsupported(location, format!("type '{other}'")),
    }
  }

  fn array(&mut self, map: &Map<String, Value>, location: &str) -> SchemaNode {
    let item = map.get("items").map_or(SchemaNode::Untyped, |items| {
      self.schema(items, &format!("{location}/items"), None)
    });
    SchemaNode::Array(Box::new(item))
  }

  fn object_shape(&mut self, map: &Map<String, Value>, location: &str) -> ObjectShape {
    let mut properties = IndexMap::new();
    if let Some(props) = map.get("properties").and_then(Value::as_object) {
      for (name, schema) in props {
        let node = self.schema(schema, &format!("{location}/properties/{name}"), None);
        properties.insert(name.clone(), node);
      }
    }

    let required: BTreeSet<String> = map
      .get("required")
      .and_then(Value::as_array)
      .map(|names| names.iter().filter_map(Value::as_str).map(String::from).collect())
      .unwrap_or_default();

    ObjectShape { properties, required }
  }

  /// First `$ref` among the entries becomes the parent; every inline object
  /// block (and the schema's own properties) merges into the extra fields.
  fn all_of(
    &mut self,
    map: &Map<String, Value>,
    entries: &[Value],
    location: &str,
    component: Option<&str>,
  ) -> SchemaNode {
    let mut parent: Option<String> = None;
    let mut extra = ObjectShape::default();

    for (index, entry) in entries.iter().enumerate() {
      let entry_location = format!("{location}/allOf/{index}");
      match self.schema(entry, &entry_location, None) {
        SchemaNode::Reference(pointer) if parent.is_none() => parent = Some(pointer),
        SchemaNode::Reference(pointer) => self.warnings.push(GenerationWarning::DiscardedParent {
          schema: component.unwrap_or(location).to_string(),
          pointer,
        }),
        SchemaNode::Object(shape) => extra.merge(shape),
        SchemaNode::Untyped => {}
        _ => {
          self.warnings.push(GenerationWarning::unsupported(
            entry_location,
            "non-object allOf entry ignored",
          ));
        }
      }
    }

    extra.merge(self.object_shape(map, location));

    match parent {
      Some(parent) => SchemaNode::Composite { parent, extra },
      None => SchemaNode::Object(extra),
    }
  }

  fn unsupported(&mut self, location: &str, detail: String) -> SchemaNode {
    self.warnings.push(GenerationWarning::unsupported(location, detail.clone()));
    SchemaNode::Unsupported(detail)
  }
}

fn description(value: &Value) -> Option<String> {
  value.get("description").and_then(Value::as_str).map(String::from)
}

fn first_media_schema(content: Option<&Value>) -> Option<&Value> {
  content
    .and_then(Value::as_object)
    .and_then(|media| media.values().next())
    .and_then(|media| media.get("schema"))
}
