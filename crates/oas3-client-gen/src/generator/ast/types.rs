use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use strum::Display;

/// Scalar types a schema primitive maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RustPrimitive {
  #[strum(to_string = "String")]
  String,
  #[strum(to_string = "i64")]
  I64,
  #[strum(to_string = "f64")]
  F64,
  #[strum(to_string = "bool")]
  Bool,
}

/// A target type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
  Primitive(RustPrimitive),
  Sequence(Box<TypeRef>),
  /// A generated model, by its Rust type name.
  Named(String),
  /// String-keyed map with dynamic values.
  Map,
  /// Anything JSON can hold.
  Dynamic,
}

impl TypeRef {
  pub fn sequence(item: TypeRef) -> Self {
    Self::Sequence(Box::new(item))
  }

  pub fn named(name: impl Into<String>) -> Self {
    Self::Named(name.into())
  }

  pub fn is_sequence(&self) -> bool {
    matches!(self, Self::Sequence(_))
  }

  /// Model names this expression refers to, directly or through sequences.
  pub fn named_target(&self) -> Option<&str> {
    match self {
      Self::Named(name) => Some(name),
      Self::Sequence(item) => item.named_target(),
      _ => None,
    }
  }

  pub fn to_rust_type(&self) -> String {
    match self {
      Self::Primitive(primitive) => primitive.to_string(),
      Self::Sequence(item) => format!("Vec<{}>", item.to_rust_type()),
      Self::Named(name) => name.clone(),
      Self::Map => "std::collections::HashMap<String, serde_json::Value>".to_string(),
      Self::Dynamic => "serde_json::Value".to_string(),
    }
  }
}

impl From<RustPrimitive> for TypeRef {
  fn from(primitive: RustPrimitive) -> Self {
    Self::Primitive(primitive)
  }
}

impl std::fmt::Display for TypeRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.to_rust_type())
  }
}

impl ToTokens for RustPrimitive {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let ident = format_ident!("{}", self.to_string());
    ident.to_tokens(tokens);
  }
}

impl ToTokens for TypeRef {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let ty = match self {
      Self::Primitive(primitive) => quote! { #primitive },
      Self::Sequence(item) => quote! { Vec<#item> },
      Self::Named(name) => {
        let ident = format_ident!("{}", name);
        quote! { #ident }
      }
      Self::Map => quote! { std::collections::HashMap<String, serde_json::Value> },
      Self::Dynamic => quote! { serde_json::Value },
    };
    ty.to_tokens(tokens);
  }
}
