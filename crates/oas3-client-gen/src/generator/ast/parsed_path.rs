use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PathParseError {
  #[strum(to_string = "unclosed '{{' at position {position} in path '{path}'")]
  UnclosedBrace { path: String, position: usize },
  #[strum(to_string = "empty parameter '{{}}' in path '{path}'")]
  EmptyParameter { path: String },
  #[strum(to_string = "unmatched '}}' at position {position} in path '{path}'")]
  UnmatchedClosingBrace { path: String, position: usize },
  #[strum(to_string = "nested '{{' at position {position} in path '{path}'")]
  NestedBraces { path: String, position: usize },
}

impl std::error::Error for PathParseError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplatePart {
  Literal(String),
  Placeholder(String),
}

/// A URL path split into literal text and `{name}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathTemplate {
  raw: String,
  parts: Vec<TemplatePart>,
}

impl PathTemplate {
  pub fn parse(path: &str) -> Result<Self, PathParseError> {
    Ok(Self {
      raw: path.to_string(),
      parts: Self::tokenize(path)?,
    })
  }

  /// The template exactly as declared.
  pub fn as_str(&self) -> &str {
    &self.raw
  }

  pub fn parts(&self) -> &[TemplatePart] {
    &self.parts
  }

  /// Placeholder names in the order they appear.
  pub fn placeholders(&self) -> impl Iterator<Item = &str> {
    self.parts.iter().filter_map(|part| match part {
      TemplatePart::Placeholder(name) => Some(name.as_str()),
      TemplatePart::Literal(_) => None,
    })
  }

  pub fn has_placeholder(&self, name: &str) -> bool {
    self.placeholders().any(|p| p == name)
  }

  /// `format!` string for the path with one `{}` per placeholder.
  pub fn format_string(&self) -> String {
    self
      .parts
      .iter()
      .map(|part| match part {
        TemplatePart::Literal(lit) => lit.as_str(),
        TemplatePart::Placeholder(_) => "{}",
      })
      .collect()
  }

  fn tokenize(path: &str) -> Result<Vec<TemplatePart>, PathParseError> {
    let mut parts = vec![];
    let mut rest = path;
    let mut offset = 0;

    while !rest.is_empty() {
      let Some(open_pos) = rest.find('{') else {
        break;
      };

      if let Some(stray_close) = rest[..open_pos].find('}') {
        return Err(PathParseError::UnmatchedClosingBrace {
          path: path.to_string(),
          position: offset + stray_close,
        });
      }

      if open_pos > 0 {
        parts.push(TemplatePart::Literal(rest[..open_pos].to_string()));
      }

      let after_open = &rest[open_pos + 1..];
      let Some(close_pos) = after_open.find('}') else {
        return Err(PathParseError::UnclosedBrace {
          path: path.to_string(),
          position: offset + open_pos,
        });
      };

      if let Some(nested) = after_open[..close_pos].find('{') {
        return Err(PathParseError::NestedBraces {
          path: path.to_string(),
          position: offset + open_pos + 1 + nested,
        });
      }

      let name = &after_open[..close_pos];
      if name.is_empty() {
        return Err(PathParseError::EmptyParameter { path: path.to_string() });
      }
      parts.push(TemplatePart::Placeholder(name.to_string()));

      let consumed = open_pos + 1 + close_pos + 1;
      offset += consumed;
      rest = &rest[consumed..];
    }

    if let Some(stray_close) = rest.find('}') {
      return Err(PathParseError::UnmatchedClosingBrace {
        path: path.to_string(),
        position: offset + stray_close,
      });
    }
    if !rest.is_empty() {
      parts.push(TemplatePart::Literal(rest.to_string()));
    }

    Ok(parts)
  }
}
