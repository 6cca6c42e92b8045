use std::collections::BTreeSet;

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};

use crate::generator::ast::{
  BodyEncoding, GeneratedMethod, ParamRole, SecurityHeader, SignatureParam, TypeRef,
};
use crate::generator::naming::identifiers::{ensure_unique, ident, to_rust_field_name};

/// Emits one async client method.
pub(crate) fn generate_method(method: &GeneratedMethod) -> TokenStream {
  let docs = &method.docs;
  let method_ident = ident(&method.name);
  let return_type = &method.return_type;

  let params = method.signature_params.iter().map(|param| {
    let param_ident = ident(&param.ident);
    let ty = param_type(param);
    quote! { #param_ident: #ty }
  });

  let url = UrlFragment(method);
  let verb = format_ident!("{}", method.verb.as_str());
  let query = QueryFragment(method);
  let body = method.body().map(body_fragment);
  let security = SecurityFragment(&method.security);
  let mutability = (method.query_params().next().is_some() || body.is_some() || !method.security.is_empty())
    .then(|| quote! { mut });

  quote! {
    #docs
    pub async fn #method_ident(&self, #(#params),*) -> Result<Option<#return_type>, ClientError> {
      #url
      let #mutability request = self.client.request(reqwest::Method::#verb, url);
      #query
      #body
      #security
      let response = request.send().await?;
      let status = response.status();
      if status == reqwest::StatusCode::NO_CONTENT {
        return Ok(None);
      }
      if !status.is_success() {
        return Err(Self::api_error(response).await);
      }
      let text = response.text().await?;
      if text.is_empty() {
        return Ok(None);
      }
      Ok(Some(serde_json::from_str(&text)?))
    }
  }
}

fn param_type(param: &SignatureParam) -> TokenStream {
  let ty = &param.type_ref;
  if param.optional {
    quote! { Option<#ty> }
  } else {
    quote! { #ty }
  }
}

fn body_fragment(body: &SignatureParam) -> TokenStream {
  let body_ident = ident(&body.ident);
  match body.role {
    ParamRole::Body(BodyEncoding::Form) => quote! { request = request.form(&#body_ident); },
    _ => quote! { request = request.json(&#body_ident); },
  }
}

struct UrlFragment<'a>(&'a GeneratedMethod);

impl ToTokens for UrlFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let method = self.0;
    let format_string = format!("{{}}{}", method.path_template.format_string());

    // Segments are bound first so the `format!` arguments stay plain idents.
    let mut used: BTreeSet<String> = method
      .signature_params
      .iter()
      .map(|param| param.ident.trim_start_matches("r#").to_string())
      .chain(["request", "response", "url", "query", "status", "text"].map(String::from))
      .collect();

    let mut bindings = vec![];
    let mut args = vec![];
    for name in method.path_template.placeholders() {
      let base = method
        .placeholder_param(name)
        .map_or_else(|| to_rust_field_name(name), |param| param.ident.clone());
      let base = base.trim_start_matches("r#");
      let segment_name = ensure_unique(&format!("{base}_segment"), &used);
      used.insert(segment_name.clone());

      let segment = ident(&segment_name);
      let value = placeholder_value(method, name);
      bindings.push(quote! { let #segment = #value; });
      args.push(segment);
    }

    quote! {
      #(#bindings)*
      let url = format!(#format_string, self.base_url, #(#args),*);
    }
    .to_tokens(tokens);
  }
}

fn placeholder_value(method: &GeneratedMethod, name: &str) -> TokenStream {
  let Some(param) = method.placeholder_param(name) else {
    return quote! { String::new() };
  };
  let param_ident = ident(&param.ident);
  if param.optional {
    quote! {
      #param_ident.as_ref().map(oas3_client_gen_support::encode_path_param).unwrap_or_default()
    }
  } else {
    quote! { oas3_client_gen_support::encode_path_param(&#param_ident) }
  }
}

struct QueryFragment<'a>(&'a GeneratedMethod);

impl ToTokens for QueryFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let pushes: Vec<TokenStream> = self.0.query_params().map(query_push).collect();
    if pushes.is_empty() {
      return;
    }

    quote! {
      let mut query: Vec<(&str, String)> = Vec::new();
      #(#pushes)*
      request = request.query(&query);
    }
    .to_tokens(tokens);
  }
}

fn query_push(param: &SignatureParam) -> TokenStream {
  let name = param.name.as_str();
  let param_ident = ident(&param.ident);

  let push_value = |value: TokenStream| match &param.type_ref {
    TypeRef::Sequence(_) => quote! {
      for item in #value {
        query.push((#name, oas3_client_gen_support::serialize_query_param(item)));
      }
    },
    _ => quote! {
      query.push((#name, oas3_client_gen_support::serialize_query_param(#value)));
    },
  };

  if param.optional {
    let push = push_value(quote! { value });
    quote! {
      if let Some(value) = &#param_ident {
        #push
      }
    }
  } else {
    push_value(quote! { &#param_ident })
  }
}

struct SecurityFragment<'a>(&'a [SecurityHeader]);

impl ToTokens for SecurityFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    if self.0.is_empty() {
      return;
    }

    let headers = self.0.iter().map(|header| {
      let name = header.header_name();
      match header {
        SecurityHeader::Bearer => quote! { request = request.header(#name, format!("Bearer {api_key}")); },
        SecurityHeader::ApiKey => quote! { request = request.header(#name, api_key.as_str()); },
      }
    });

    quote! {
      if let Some(api_key) = &self.api_key {
        #(#headers)*
      }
    }
    .to_tokens(tokens);
  }
}
