use std::fmt::Display;

/// Marker of ids this engine hands out for user-space virtual specifiers.
pub const VIRTUAL_MARKER: &str = "\0balafon:";
/// Marker of ids that point at chunks this engine emitted itself.
pub const ENTRY_MARKER: &str = "\0balafon-entry:";

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum IdNamespace {
  Virtual,
  Entry,
}

impl IdNamespace {
  fn marker(self) -> &'static str {
    match self {
      IdNamespace::Virtual => VIRTUAL_MARKER,
      IdNamespace::Entry => ENTRY_MARKER,
    }
  }
}

/// A resolved synthetic id. The marker is stripped losslessly by [VirtualModuleId::requested].
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VirtualModuleId {
  value: String,
  namespace: IdNamespace,
}

impl VirtualModuleId {
  pub fn new(requested: &str, namespace: IdNamespace) -> Self {
    Self {
      value: format!("{}{requested}", namespace.marker()),
      namespace,
    }
  }

  pub fn virtual_module(requested: &str) -> Self {
    Self::new(requested, IdNamespace::Virtual)
  }

  pub fn entry(name: &str) -> Self {
    Self::new(name, IdNamespace::Entry)
  }

  /// Recognizes an internal id previously handed out by this engine.
  pub fn parse(internal: &str) -> Option<Self> {
    // `ENTRY_MARKER` is not a prefix of `VIRTUAL_MARKER`, check order does not matter
    [IdNamespace::Entry, IdNamespace::Virtual]
      .into_iter()
      .find(|ns| internal.starts_with(ns.marker()) && internal.len() > ns.marker().len())
      .map(|namespace| Self {
        value: internal.to_string(),
        namespace,
      })
  }

  pub fn namespace(&self) -> IdNamespace {
    self.namespace
  }

  pub fn requested(&self) -> &str {
    &self.value[self.namespace.marker().len()..]
  }

  pub fn id(&self) -> &str {
    &self.value
  }
}

impl Display for VirtualModuleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.value)
  }
}

impl AsRef<str> for VirtualModuleId {
  fn as_ref(&self) -> &str {
    &self.value
  }
}
