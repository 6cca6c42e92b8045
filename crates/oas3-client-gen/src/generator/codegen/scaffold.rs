//! Fixed items every generated client file carries: the error types and the
//! client struct with its session lifecycle.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

pub(crate) fn generate_error_types() -> TokenStream {
  quote! {
    /// A non-success response from the API.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ApiError {
      pub status: u16,
      /// Parsed JSON error body, or the raw text as a JSON string.
      pub body: serde_json::Value,
    }

    impl std::fmt::Display for ApiError {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "API error {}: {}", self.status, self.body)
      }
    }

    impl std::error::Error for ApiError {}

    #[derive(Debug)]
    pub enum ClientError {
      Api(ApiError),
      Transport(reqwest::Error),
      Decode(serde_json::Error),
    }

    impl std::fmt::Display for ClientError {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
          Self::Api(err) => write!(f, "{err}"),
          Self::Transport(err) => write!(f, "transport error: {err}"),
          Self::Decode(err) => write!(f, "failed to decode response: {err}"),
        }
      }
    }

    impl std::error::Error for ClientError {
      fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
          Self::Api(err) => Some(err),
          Self::Transport(err) => Some(err),
          Self::Decode(err) => Some(err),
        }
      }
    }

    impl From<ApiError> for ClientError {
      fn from(err: ApiError) -> Self {
        Self::Api(err)
      }
    }

    impl From<reqwest::Error> for ClientError {
      fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
      }
    }

    impl From<serde_json::Error> for ClientError {
      fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
      }
    }
  }
}

pub(crate) fn generate_client(client_name: &str, methods: &[TokenStream]) -> TokenStream {
  let client_ident = format_ident!("{client_name}");

  quote! {
    #[derive(Debug, Clone)]
    pub struct #client_ident {
      base_url: String,
      api_key: Option<String>,
      client: reqwest::Client,
    }

    impl #client_ident {
      /// Opens an HTTP session against `base_url`. When `api_key` is set it is
      /// sent with every operation that declares a bearer or API key scheme.
      pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().build()?;
        Ok(Self { base_url, api_key, client })
      }

      /// Releases the HTTP session. Dropping the client has the same effect.
      pub fn close(self) {
        drop(self.client);
      }

      pub fn base_url(&self) -> &str {
        &self.base_url
      }

      async fn api_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = match response.text().await {
          Ok(text) => serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)),
          Err(err) => return ClientError::Transport(err),
        };
        ClientError::Api(ApiError { status, body })
      }

      #(#methods)*
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn render(tokens: TokenStream) -> String {
    prettyplease::unparse(&syn::parse2(tokens).unwrap())
  }

  #[test]
  fn test_error_types_parse_and_cover_variants() {
    let code = render(generate_error_types());
    assert!(code.contains("pub struct ApiError"));
    assert!(code.contains("pub status: u16"));
    assert!(code.contains("pub body: serde_json::Value"));
    assert!(code.contains("Transport(reqwest::Error)"));
    assert!(code.contains("impl From<serde_json::Error> for ClientError"));
  }

  #[test]
  fn test_client_lifecycle() {
    let code = render(generate_client("PetstoreClient", &[]));
    assert!(code.contains("pub struct PetstoreClient"));
    assert!(code.contains("api_key: Option<String>"));
    assert!(code.contains("pub fn close(self)"));
    assert!(code.contains("trim_end_matches('/')"));
  }
}
