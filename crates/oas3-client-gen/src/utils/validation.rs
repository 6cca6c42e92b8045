use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const VALID_MESSAGE: &str = "Specification is valid";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{path}: {message}")]
  Structure { path: String, message: String },
  #[error("unsupported OpenAPI version '{version}', expected 3.x")]
  UnsupportedVersion { version: String },
}

/// Outcome of `validate`, printed as text or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
  pub is_valid: bool,
  pub message: String,
}

impl From<Result<(), ValidationError>> for ValidationVerdict {
  fn from(result: Result<(), ValidationError>) -> Self {
    match result {
      Ok(()) => Self {
        is_valid: true,
        message: VALID_MESSAGE.to_string(),
      },
      Err(err) => Self {
        is_valid: false,
        message: err.to_string(),
      },
    }
  }
}

/// Checks the document against the OpenAPI 3 object model.
pub fn validate_document(document: &Value) -> Result<(), ValidationError> {
  let version = document.get("openapi").and_then(Value::as_str).unwrap_or_default();
  if !version.starts_with("3.") {
    return Err(ValidationError::UnsupportedVersion {
      version: version.to_string(),
    });
  }

  serde_path_to_error::deserialize::<_, oas3::Spec>(document)
    .map(|_| ())
    .map_err(|err| ValidationError::Structure {
      path: err.path().to_string(),
      message: err.inner().to_string(),
    })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_minimal_document_is_valid() {
    let document = json!({
      "openapi": "3.0.3",
      "info": { "title": "Pets", "version": "1.0.0" },
      "paths": {}
    });

    let verdict = ValidationVerdict::from(validate_document(&document));
    assert!(verdict.is_valid);
    assert_eq!(verdict.message, "Specification is valid");
  }

  #[test]
  fn test_swagger_documents_are_rejected() {
    let document = json!({ "swagger": "2.0", "info": { "title": "Old", "version": "1" } });

    let err = validate_document(&document).unwrap_err();
    assert_eq!(err, ValidationError::UnsupportedVersion { version: String::new() });
  }

  #[test]
  fn test_structure_errors_carry_the_path() {
    let document = json!({
      "openapi": "3.0.0",
      "info": { "title": "Pets", "version": 7 },
      "paths": {}
    });

    let verdict = ValidationVerdict::from(validate_document(&document));
    assert!(!verdict.is_valid);
    assert!(verdict.message.contains("info.version"), "{}", verdict.message);
  }

  #[test]
  fn test_verdict_serializes_for_json_output() {
    let verdict = ValidationVerdict {
      is_valid: false,
      message: "info: missing field `title`".to_string(),
    };
    assert_eq!(
      serde_json::to_value(&verdict).unwrap(),
      json!({ "is_valid": false, "message": "info: missing field `title`" })
    );
  }
}
