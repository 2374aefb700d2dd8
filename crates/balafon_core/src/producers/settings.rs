use balafon_common::{ContentKind, ModuleSource};

use crate::{utils::js_value, BuildResult, LoadContext, Producer};

/// Project settings as reported by the tool's environment command.
#[derive(Debug)]
pub struct Settings;

#[async_trait::async_trait]
impl Producer for Settings {
  fn kind(&self) -> ContentKind {
    ContentKind::Settings
  }

  async fn load(&self, cx: &mut LoadContext<'_>) -> BuildResult<ModuleSource> {
    let env = cx.session.environment().await;
    Ok(ModuleSource::new(format!(
      "export default {};\n",
      js_value(&env.settings)
    )))
  }
}
