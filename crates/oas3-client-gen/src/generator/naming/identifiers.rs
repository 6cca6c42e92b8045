use std::{
  collections::{BTreeSet, HashSet},
  sync::LazyLock,
};

use any_ascii::any_ascii;
use inflections::Inflect;
use proc_macro2::{Ident, Span};
use regex::Regex;

static KEYWORDS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "as", "break", "const", "continue", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let",
    "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "type",
    "unsafe", "use", "where", "while", "async", "await", "dyn", "try", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "gen",
  ]
  .into_iter()
  .collect()
});

/// Keywords that cannot be raw identifiers.
static PATH_KEYWORDS: [&str; 4] = ["crate", "self", "super", "Self"];

/// Names the generated file already uses or that would shadow the prelude.
static RESERVED_TYPE_NAMES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "Box", "Clone", "Copy", "Default", "Display", "Error", "HashMap", "Option", "Result", "Self", "Send", "String",
    "Sync", "Type", "Value", "Vec",
  ]
  .into_iter()
  .collect()
});

static INVALID_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex"));
static MULTI_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").expect("valid regex"));

/// Transliterates to ASCII, replaces anything outside `[A-Za-z0-9_]` with
/// underscores, collapses runs and trims the ends.
pub(crate) fn sanitize(input: &str) -> String {
  if input.is_empty() {
    return String::new();
  }

  let ascii = any_ascii(input);
  let replaced = INVALID_CHARS_RE.replace_all(&ascii, "_");
  let collapsed = MULTI_UNDERSCORE_RE.replace_all(&replaced, "_");

  collapsed.trim_matches('_').to_string()
}

/// Appends a numeric suffix until the name is not in `used_names`.
pub(crate) fn ensure_unique(base_name: &str, used_names: &BTreeSet<String>) -> String {
  if !used_names.contains(base_name) {
    return base_name.to_string();
  }
  let mut i = 2;
  loop {
    let new_name = format!("{base_name}{i}");
    if !used_names.contains(&new_name) {
      return new_name;
    }
    i += 1;
  }
}

/// Converts a JSON property, parameter or operation name into a `snake_case`
/// identifier.
///
/// Keywords become raw identifiers (`r#type`); `self`, `super`, `crate` get a
/// trailing underscore. Leading digits get a `_` prefix, and a name with no
/// usable characters becomes `field`.
pub(crate) fn to_rust_field_name(name: &str) -> String {
  let has_leading_minus = name.starts_with('-');
  let name_without_minus = name.strip_prefix('-').unwrap_or(name);

  let mut ident = sanitize(name_without_minus).to_snake_case();

  if ident.chars().all(|c| c == '_') {
    return "field".to_string();
  }

  if has_leading_minus {
    ident = format!("negative_{ident}");
  }

  if PATH_KEYWORDS.contains(&ident.as_str()) {
    return format!("{ident}_");
  }

  if KEYWORDS.contains(ident.as_str()) {
    return format!("r#{ident}");
  }

  prefix_if_digit_start(&mut ident, '_');
  ident
}

/// Converts a schema or document title into a `PascalCase` type name.
///
/// Names that are already mixed case without separators keep their
/// capitalization (`HTTPConnection`). Prelude and scaffold names get a
/// `Type` suffix, leading digits a `T` prefix, and an empty result becomes
/// `Unnamed`.
pub(crate) fn to_rust_type_name(name: &str) -> String {
  let ascii = any_ascii(name);

  let has_separators = ascii.contains(|c: char| !c.is_ascii_alphanumeric());
  let has_upper = ascii.chars().any(|c| c.is_ascii_uppercase());
  let has_lower = ascii.chars().any(|c| c.is_ascii_lowercase());

  let mut ident = if !has_separators && has_upper && has_lower {
    let mut chars = ascii.chars();
    match chars.next() {
      Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
      None => String::new(),
    }
  } else {
    sanitize(&ascii).to_pascal_case()
  };

  if ident.is_empty() {
    return "Unnamed".to_string();
  }

  if RESERVED_TYPE_NAMES.contains(ident.as_str()) {
    ident.push_str("Type");
  }

  prefix_if_digit_start(&mut ident, 'T');
  ident
}

fn prefix_if_digit_start(ident: &mut String, prefix: char) {
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, prefix);
  }
}

/// Builds a `proc_macro2::Ident` from a name produced by this module,
/// honouring the `r#` prefix.
pub(crate) fn ident(name: &str) -> Ident {
  match name.strip_prefix("r#") {
    Some(raw) => Ident::new_raw(raw, Span::call_site()),
    None => Ident::new(name, Span::call_site()),
  }
}
