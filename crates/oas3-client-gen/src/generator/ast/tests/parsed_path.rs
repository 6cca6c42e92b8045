use crate::generator::ast::{PathParseError, PathTemplate, TemplatePart};

#[test]
fn literal_path_has_no_placeholders() {
  let template = PathTemplate::parse("/pets").unwrap();
  assert_eq!(template.parts(), &[TemplatePart::Literal("/pets".to_string())]);
  assert_eq!(template.placeholders().count(), 0);
  assert_eq!(template.format_string(), "/pets");
}

#[test]
fn placeholders_keep_order() {
  let template = PathTemplate::parse("/stores/{storeId}/items/{id}").unwrap();
  let names: Vec<_> = template.placeholders().collect();
  assert_eq!(names, vec!["storeId", "id"]);
  assert_eq!(template.format_string(), "/stores/{}/items/{}");
  assert_eq!(template.as_str(), "/stores/{storeId}/items/{id}");
  assert!(template.has_placeholder("id"));
  assert!(!template.has_placeholder("other"));
}

#[test]
fn mixed_segment() {
  let template = PathTemplate::parse("/files/{name}.{ext}").unwrap();
  assert_eq!(
    template.parts(),
    &[
      TemplatePart::Literal("/files/".to_string()),
      TemplatePart::Placeholder("name".to_string()),
      TemplatePart::Literal(".".to_string()),
      TemplatePart::Placeholder("ext".to_string()),
    ]
  );
  assert_eq!(template.format_string(), "/files/{}.{}");
}

#[test]
fn unclosed_brace() {
  let err = PathTemplate::parse("/pets/{id").unwrap_err();
  assert_eq!(
    err,
    PathParseError::UnclosedBrace {
      path: "/pets/{id".to_string(),
      position: 6,
    }
  );
  assert_eq!(err.to_string(), "unclosed '{' at position 6 in path '/pets/{id'");
}

#[test]
fn unmatched_closing_brace() {
  let err = PathTemplate::parse("/pets/id}").unwrap_err();
  assert!(matches!(err, PathParseError::UnmatchedClosingBrace { position: 8, .. }));

  let err = PathTemplate::parse("/pets/{id}/x}").unwrap_err();
  assert!(matches!(err, PathParseError::UnmatchedClosingBrace { position: 12, .. }));
}

#[test]
fn nested_and_empty_braces() {
  assert!(matches!(
    PathTemplate::parse("/a/{b{c}}").unwrap_err(),
    PathParseError::NestedBraces { position: 5, .. }
  ));
  assert!(matches!(
    PathTemplate::parse("/a/{}").unwrap_err(),
    PathParseError::EmptyParameter { .. }
  ));
}
