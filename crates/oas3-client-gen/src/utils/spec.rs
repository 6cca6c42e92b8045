use std::{ffi::OsStr, path::Path};

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext.to_ascii_lowercase().as_str() {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }

  #[must_use]
  pub fn from_path(path: &Path) -> Self {
    path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(Self::default(), Self::from_extension)
  }
}

/// Memory-maps an input document and parses it into a JSON value with keys in
/// declaration order.
pub struct SpecLoader {
  file: AsyncMmapFile,
  format: SpecFormat,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("failed to open {}", path.display()))?;

    Ok(Self {
      file,
      format: SpecFormat::from_path(path),
    })
  }

  pub fn parse(&self) -> anyhow::Result<Value> {
    parse_document(self.file.as_slice(), self.format)
  }
}

pub fn parse_document(bytes: &[u8], format: SpecFormat) -> anyhow::Result<Value> {
  match format {
    SpecFormat::Json => serde_json::from_slice(bytes).context("failed to parse JSON document"),
    SpecFormat::Yaml => {
      // Non-string keys (bare `200:` status codes) become strings on conversion.
      let yaml: serde_yaml::Value = serde_yaml::from_slice(bytes).context("failed to parse YAML document")?;
      serde_json::to_value(yaml).context("YAML document cannot be represented as JSON")
    }
  }
}
