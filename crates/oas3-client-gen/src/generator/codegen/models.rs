use std::collections::BTreeSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::generator::{
  ast::{Documentation, GeneratedModel, ModelField, ModelKind},
  naming::identifiers::{ensure_unique, ident, to_rust_field_name},
};

pub(crate) fn generate_model(model: &GeneratedModel) -> TokenStream {
  let name = format_ident!("{}", model.name);
  let docs = Documentation::from_raw(&model.doc_comment);

  match &model.kind {
    ModelKind::Alias(target) => quote! {
      #docs
      pub type #name = #target;
    },
    ModelKind::Struct => {
      let mut used = BTreeSet::new();
      let parent = model.parent_name.as_ref().map(|parent_name| {
        let field_ident = unique_field_ident(parent_name, &mut used);
        let parent_ident = format_ident!("{parent_name}");
        quote! {
          #[serde(flatten)]
          pub #field_ident: #parent_ident,
        }
      });
      let fields = model.fields.iter().map(|field| generate_field(field, &mut used));

      quote! {
        #docs
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct #name {
          #parent
          #(#fields)*
        }
      }
    }
  }
}

fn generate_field(field: &ModelField, used: &mut BTreeSet<String>) -> TokenStream {
  let field_ident = unique_field_ident(&field.name, used);
  let json_name = field.name.as_str();
  let ty = field_type(field);

  let renamed = field_ident.to_string().trim_start_matches("r#") != json_name;
  let serde_attr = match (renamed, field.optional) {
    (true, true) => quote! { #[serde(rename = #json_name, default, skip_serializing_if = "Option::is_none")] },
    (true, false) => quote! { #[serde(rename = #json_name)] },
    (false, true) => quote! { #[serde(default, skip_serializing_if = "Option::is_none")] },
    (false, false) => quote! {},
  };

  quote! {
    #serde_attr
    pub #field_ident: #ty,
  }
}

fn field_type(field: &ModelField) -> TokenStream {
  let base = &field.type_ref;
  let mut ty = quote! { #base };
  if field.boxed && !base.is_sequence() {
    ty = quote! { Box<#ty> };
  }
  if field.optional {
    ty = quote! { Option<#ty> };
  }
  ty
}

fn unique_field_ident(name: &str, used: &mut BTreeSet<String>) -> proc_macro2::Ident {
  let field_name = ensure_unique(&to_rust_field_name(name), used);
  used.insert(field_name.clone());
  ident(&field_name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::generator::ast::{RustPrimitive, TypeRef};

  fn render(model: &GeneratedModel) -> String {
    prettyplease::unparse(&syn::parse2(generate_model(model)).unwrap())
  }

  #[test]
  fn test_struct_fields_and_optionality() {
    let model = GeneratedModel::builder()
      .name("Pet")
      .doc_comment("A pet")
      .fields(vec![
        ModelField::builder()
          .name("name")
          .type_ref(RustPrimitive::String.into())
          .build(),
        ModelField::builder()
          .name("age")
          .type_ref(RustPrimitive::I64.into())
          .optional(true)
          .build(),
      ])
      .build();

    let code = render(&model);
    assert!(code.contains("/// A pet"));
    assert!(code.contains("pub struct Pet {"));
    assert!(code.contains("pub name: String,"));
    assert!(code.contains("#[serde(default, skip_serializing_if = \"Option::is_none\")]"));
    assert!(code.contains("pub age: Option<i64>,"));
  }

  #[test]
  fn test_renamed_and_keyword_fields() {
    let model = GeneratedModel::builder()
      .name("Order")
      .fields(vec![
        ModelField::builder()
          .name("orderId")
          .type_ref(RustPrimitive::I64.into())
          .build(),
        ModelField::builder()
          .name("type")
          .type_ref(RustPrimitive::String.into())
          .build(),
        ModelField::builder()
          .name("order_id")
          .type_ref(RustPrimitive::String.into())
          .build(),
      ])
      .build();

    let code = render(&model);
    assert!(code.contains("#[serde(rename = \"orderId\")]"));
    assert!(code.contains("pub order_id: i64,"));
    assert!(code.contains("pub r#type: String,"));
    assert!(!code.contains("rename = \"type\""));
    assert!(code.contains("pub order_id2: String,"));
  }

  #[test]
  fn test_symbol_only_names_get_a_real_ident() {
    let model = GeneratedModel::builder()
      .name("Flags")
      .fields(vec![
        ModelField::builder()
          .name("-")
          .type_ref(RustPrimitive::String.into())
          .optional(true)
          .build(),
        ModelField::builder()
          .name("")
          .type_ref(RustPrimitive::Bool.into())
          .build(),
      ])
      .build();

    let code = render(&model);
    assert!(code.contains("#[serde(rename = \"-\", default, skip_serializing_if = \"Option::is_none\")]"));
    assert!(code.contains("pub field: Option<String>,"));
    assert!(code.contains("#[serde(rename = \"\")]"));
    assert!(code.contains("pub field2: bool,"));
    assert!(!code.contains("pub _:"));
  }

  #[test]
  fn test_composite_flattens_parent() {
    let model = GeneratedModel::builder()
      .name("Dog")
      .parent_name("Pet".to_string())
      .fields(vec![
        ModelField::builder()
          .name("bark")
          .type_ref(RustPrimitive::Bool.into())
          .optional(true)
          .build(),
      ])
      .build();

    let code = render(&model);
    assert!(code.contains("#[serde(flatten)]"));
    assert!(code.contains("pub pet: Pet,"));
    assert!(code.contains("pub bark: Option<bool>,"));
  }

  #[test]
  fn test_boxed_field_and_alias() {
    let model = GeneratedModel::builder()
      .name("Node")
      .fields(vec![
        ModelField::builder()
          .name("next")
          .type_ref(TypeRef::named("Node"))
          .optional(true)
          .boxed(true)
          .build(),
      ])
      .build();
    assert!(render(&model).contains("pub next: Option<Box<Node>>,"));

    let model = GeneratedModel::builder()
      .name("Node")
      .fields(vec![
        ModelField::builder()
          .name("children")
          .type_ref(TypeRef::sequence(TypeRef::named("Node")))
          .boxed(true)
          .build(),
      ])
      .build();
    assert!(render(&model).contains("pub children: Vec<Node>,"));

    let alias = GeneratedModel::builder()
      .name("Tags")
      .kind(ModelKind::Alias(TypeRef::sequence(RustPrimitive::String.into())))
      .build();
    assert!(render(&alias).contains("pub type Tags = Vec<String>;"));
  }
}
