use std::path::Path;

use crossterm::style::Stylize;

use super::load_document;
use crate::{
  ui::Colors,
  utils::{ValidationVerdict, validate_document},
};

/// Prints the verdict. A document that cannot be read or parsed at all is an
/// invalid verdict, not an error.
pub async fn validate_spec(input: &Path, json: bool, colors: &Colors) -> anyhow::Result<ValidationVerdict> {
  let verdict = match load_document(input).await {
    Ok(document) => ValidationVerdict::from(validate_document(&document)),
    Err(err) => ValidationVerdict {
      is_valid: false,
      message: format!("{err:#}"),
    },
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&verdict)?);
  } else if verdict.is_valid {
    println!("{} {}", "✓".with(colors.success()), verdict.message.as_str().with(colors.primary()));
  } else {
    eprintln!("{} {}", "✗".with(colors.accent()), verdict.message.as_str().with(colors.primary()));
  }

  Ok(verdict)
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;
  use crate::ui::colors::Theme;

  #[tokio::test]
  async fn test_fixture_is_valid() {
    let input = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/petstore.yaml");
    let verdict = validate_spec(&input, true, &Colors::new(false, Theme::Dark)).await.unwrap();
    assert!(verdict.is_valid);
    assert_eq!(verdict.message, "Specification is valid");
  }

  #[tokio::test]
  async fn test_unreadable_document_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("garbage.json");
    tokio::fs::write(&input, "not json at all").await.unwrap();

    let verdict = validate_spec(&input, false, &Colors::new(false, Theme::Dark)).await.unwrap();
    assert!(!verdict.is_valid);
    assert!(verdict.message.starts_with("failed to parse JSON document"));
  }
}
