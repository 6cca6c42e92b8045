use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
  lines: Vec<String>,
}

impl Documentation {
  /// Splits free text into doc lines. Escaped `\n` sequences count as breaks.
  #[must_use]
  pub fn from_raw(input: &str) -> Self {
    Self {
      lines: input.replace("\\n", "\n").lines().map(String::from).collect(),
    }
  }

  #[must_use]
  pub fn from_optional(desc: Option<&str>) -> Self {
    desc.map_or_else(Self::default, Self::from_raw)
  }

  #[must_use]
  pub fn from_lines(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      lines: lines.into_iter().map(Into::into).collect(),
    }
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  #[must_use]
  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  pub fn push(&mut self, line: impl Into<String>) {
    self.lines.push(line.into());
  }

  /// Appends a paragraph, separated from existing text by a blank doc line.
  pub fn push_paragraph(&mut self, text: &str) {
    let paragraph = Self::from_raw(text);
    if paragraph.is_empty() {
      return;
    }
    if !self.lines.is_empty() {
      self.lines.push(String::new());
    }
    self.lines.extend(paragraph.lines);
  }
}

impl ToTokens for Documentation {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    if self.lines.is_empty() {
      return;
    }
    // rustdoc expects a leading space after `///`
    let doc_lines = self.lines.iter().map(|line| {
      let line = if line.is_empty() { String::new() } else { format!(" {line}") };
      quote! { #[doc = #line] }
    });
    quote! { #(#doc_lines)* }.to_tokens(tokens);
  }
}
