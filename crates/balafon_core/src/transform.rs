use std::sync::Arc;

use balafon_plugin::TemplateTransform;

/// Picks the transform the host exposes under `name`. Looked up once per configured session.
pub fn find_transform(
  candidates: &[Arc<dyn TemplateTransform>],
  name: &str,
) -> Option<Arc<dyn TemplateTransform>> {
  let found = candidates.iter().find(|t| t.name() == name).cloned();
  if found.is_none() {
    tracing::debug!("no template transform named {name:?}");
  }
  found
}
