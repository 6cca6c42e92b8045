use anyhow::Context;
use proc_macro2::TokenStream;
use quote::quote;

use super::ast::{GeneratedMethod, GeneratedModel};

pub mod methods;
pub mod models;
pub mod scaffold;


/// Metadata about the API document for the generated file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMetadata {
  pub title: String,
  pub version: String,
  pub description: Option<String>,
  /// Where the document was read from.
  pub source: String,
}

/// Everything a renderer needs to produce the client file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationUnit {
  pub metadata: CodeMetadata,
  pub client_name: String,
  pub models: Vec<GeneratedModel>,
  pub methods: Vec<GeneratedMethod>,
}

/// Assembles a generation unit into source text. Makes no semantic decisions.
pub trait Renderer {
  fn render(&self, unit: &GenerationUnit) -> anyhow::Result<String>;
}

/// Renders a Rust module using `reqwest` and `serde`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustRenderer;

impl Renderer for RustRenderer {
  fn render(&self, unit: &GenerationUnit) -> anyhow::Result<String> {
    let code = generate(unit);
    let syntax_tree = syn::parse2(code).context("generated code is not valid Rust")?;
    let formatted = prettyplease::unparse(&syntax_tree);
    Ok(format!("{}\n{formatted}", file_header(&unit.metadata)))
  }
}

pub(crate) fn generate(unit: &GenerationUnit) -> TokenStream {
  let errors = scaffold::generate_error_types();
  let models = unit.models.iter().map(models::generate_model);
  let methods: Vec<TokenStream> = unit.methods.iter().map(methods::generate_method).collect();
  let client = scaffold::generate_client(&unit.client_name, &methods);

  quote! {
    #errors

    #(#models)*

    #client
  }
}

fn file_header(metadata: &CodeMetadata) -> String {
  let description = metadata
    .description
    .as_deref()
    .map(|text| {
      let lines: Vec<String> = text
        .lines()
        .map(|line| format!("//! {line}").trim_end().to_string())
        .collect();
      format!("//!\n{}\n", lines.join("\n"))
    })
    .unwrap_or_default();

  format!(
    r"//! AUTO-GENERATED CODE - DO NOT EDIT!
//!
//! {}
//! Version: {}
//! Source: {}
//! Generated by `oas3-client-gen`
{description}//!
//! Requires `reqwest` (with the `json` feature), `serde`, `serde_json` and
//! `oas3-client-gen-support`.
",
    metadata.title, metadata.version, metadata.source
  )
}
