use balafon_common::{ContentKind, ModuleSource};

use super::optional_tool_output;
use crate::{names, utils::js_string, BuildResult, LoadContext, Producer};

#[derive(Debug)]
pub struct CoreStylesheet;

/// Injects `css` into the document head when there is one and exports the text.
pub fn style_injection(css: &str) -> String {
  format!(
    r#"const css = {};
if (typeof document !== "undefined") {{
  const style = document.createElement("style");
  style.setAttribute("data-balafon", "core");
  style.textContent = css;
  document.head.appendChild(style);
}}
export default css;
"#,
    js_string(css)
  )
}

#[async_trait::async_trait]
impl Producer for CoreStylesheet {
  fn kind(&self) -> ContentKind {
    ContentKind::CoreStylesheet
  }

  async fn load(&self, cx: &mut LoadContext<'_>) -> BuildResult<ModuleSource> {
    let body = optional_tool_output(
      cx.session,
      names::CORE_STYLESHEET,
      names::command::CORE_STYLESHEET,
    )
    .await
    .map(|css| ModuleSource::new(style_injection(css.trim())));
    cx.emit(
      ContentKind::CoreStylesheet,
      names::stem_of(names::CORE_STYLESHEET),
      body,
    )
    .await
  }
}
