//! Runtime helpers shared by clients produced with `oas3-client-gen`.
//!
//! Generated methods call into this crate to turn typed parameters into URL
//! path segments and query values.

pub use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left untouched in a path segment (RFC 3986 unreserved set).
pub const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[inline]
#[must_use]
pub fn percent_encode_path_segment(segment: &str) -> String {
  utf8_percent_encode(segment, PATH_ENCODE_SET).to_string()
}

/// Renders a parameter value as plain text.
///
/// Scalars and unit enum variants render bare (`42`, `true`, `available`).
/// Anything `serde_plain` cannot express falls back to compact JSON so
/// structured values still reach the server.
#[inline]
pub fn serialize_query_param<T: serde::Serialize>(value: &T) -> String {
  serde_plain::to_string(value)
    .or_else(|_| serde_json::to_string(value))
    .unwrap_or_default()
}

/// Renders a path parameter and percent-encodes it as a single segment.
#[inline]
pub fn encode_path_param<T: serde::Serialize>(value: &T) -> String {
  percent_encode_path_segment(&serialize_query_param(value))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(serde::Serialize)]
  #[serde(rename_all = "lowercase")]
  enum Status {
    Available,
  }

  #[derive(serde::Serialize)]
  struct Range {
    min: i32,
    max: i32,
  }

  #[test]
  fn test_percent_encode_path_segment() {
    assert_eq!(percent_encode_path_segment("abc-_.~"), "abc-_.~");
    assert_eq!(percent_encode_path_segment("a b/c"), "a%20b%2Fc");
    assert_eq!(percent_encode_path_segment("caf\u{e9}"), "caf%C3%A9");
  }

  #[test]
  fn test_serialize_query_param_scalars() {
    assert_eq!(serialize_query_param(&42_i64), "42");
    assert_eq!(serialize_query_param(&1.5_f64), "1.5");
    assert_eq!(serialize_query_param(&true), "true");
    assert_eq!(serialize_query_param(&"plain"), "plain");
    assert_eq!(serialize_query_param(&Status::Available), "available");
  }

  #[test]
  fn test_serialize_query_param_falls_back_to_json() {
    let range = Range { min: 0, max: 1000 };
    assert_eq!(serialize_query_param(&range), r#"{"min":0,"max":1000}"#);
  }

  #[test]
  fn test_owned_strings_and_items() {
    let tags = vec!["a b".to_string(), "c".to_string()];
    let rendered: Vec<String> = tags.iter().map(serialize_query_param).collect();
    assert_eq!(rendered, ["a b", "c"]);
    assert_eq!(encode_path_param(&tags[0]), "a%20b");
  }

  #[test]
  fn test_encode_path_param() {
    assert_eq!(encode_path_param(&7_i64), "7");
    assert_eq!(encode_path_param(&"red shoes"), "red%20shoes");
  }
}
