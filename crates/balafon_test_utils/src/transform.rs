use balafon_error::anyhow;
use balafon_plugin::TemplateTransform;

/// Compiles a template into a module exporting its source. Fails on sources containing `<error>`.
#[derive(Debug)]
pub struct FakeTransform {
  name: String,
}

impl Default for FakeTransform {
  fn default() -> Self {
    Self::named("vite:vue")
  }
}

impl FakeTransform {
  pub fn named(name: &str) -> Self {
    Self {
      name: name.to_string(),
    }
  }
}

#[async_trait::async_trait]
impl TemplateTransform for FakeTransform {
  fn name(&self) -> &str {
    &self.name
  }

  async fn transform(&self, source: &str, _id: &str, ssr: bool) -> anyhow::Result<String> {
    if source.contains("<error>") {
      anyhow::bail!("unexpected <error> element");
    }
    Ok(format!(
      "export default {{ template: {}, ssr: {ssr} }};\n",
      serde_json::Value::String(source.to_string())
    ))
  }
}
