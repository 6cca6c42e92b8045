use quote::quote;

use crate::generator::ast::{RustPrimitive, TypeRef};

#[test]
fn rust_type_strings() {
  assert_eq!(TypeRef::from(RustPrimitive::I64).to_rust_type(), "i64");
  assert_eq!(TypeRef::sequence(RustPrimitive::I64.into()).to_rust_type(), "Vec<i64>");
  assert_eq!(TypeRef::named("Foo").to_rust_type(), "Foo");
  assert_eq!(
    TypeRef::Map.to_rust_type(),
    "std::collections::HashMap<String, serde_json::Value>"
  );
  assert_eq!(TypeRef::Dynamic.to_string(), "serde_json::Value");
}

#[test]
fn tokens_match_type_strings() {
  let ty = TypeRef::sequence(TypeRef::named("Pet"));
  assert_eq!(quote! { #ty }.to_string(), quote! { Vec<Pet> }.to_string());

  let ty = TypeRef::from(RustPrimitive::String);
  assert_eq!(quote! { #ty }.to_string(), "String");
}

#[test]
fn named_target_sees_through_sequences() {
  let ty = TypeRef::sequence(TypeRef::sequence(TypeRef::named("Node")));
  assert_eq!(ty.named_target(), Some("Node"));
  assert_eq!(TypeRef::Dynamic.named_target(), None);
}
