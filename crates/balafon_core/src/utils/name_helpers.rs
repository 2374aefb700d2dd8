use once_cell::sync::Lazy;
use phf::{phf_set, Set};

pub static RESERVED_NAMES: Set<&'static str> = phf_set! {
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "NaN",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "undefined",
    "var",
    "void",
    "while",
    "with",
    "yield",
};

static IDENTIFIER: Lazy<regex::Regex> =
  Lazy::new(|| regex::Regex::new(r"^[a-zA-Z_$][a-zA-Z0-9_$]*$").expect("valid identifier regex"));

static ILLEGAL_CHARACTERS: Lazy<regex::Regex> =
  Lazy::new(|| regex::Regex::new(r"[^\w$]").expect("valid illegal character regex"));

fn starts_with_digit(s: &str) -> bool {
  s.chars().next().map_or(false, |c| c.is_ascii_digit())
}

fn need_escape(s: &str) -> bool {
  s.is_empty() || starts_with_digit(s) || RESERVED_NAMES.contains(s) || s == "arguments"
}

/// Name usable after `export { local as <name> }` or as an object key: quoted unless it is a plain identifier.
pub fn export_name(name: &str) -> String {
  if IDENTIFIER.is_match(name) {
    name.to_string()
  } else {
    super::js_string(name)
  }
}

/// A legal local binding derived from `value`.
pub fn make_legal(value: &str) -> String {
  let value = ILLEGAL_CHARACTERS.replace_all(value, "_");

  let ret = if need_escape(&value) {
    format!("_{}", value)
  } else {
    value.to_string()
  };

  if ret != value {
    tracing::trace!("illegal identifier: {}, replaced with {}", value, ret);
  }

  ret
}
