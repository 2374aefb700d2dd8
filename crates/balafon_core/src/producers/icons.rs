use balafon_common::{ContentKind, ModuleSource};
use balafon_error::Error;

use super::{file_segment, json_module, optional_tool_output, parse_json};
use crate::{names, BuildResult, LoadContext, Producer};

/// Every icon of the project in one JSON map, `name -> svg`.
#[derive(Debug)]
pub struct IconLibrary;

#[async_trait::async_trait]
impl Producer for IconLibrary {
  fn kind(&self) -> ContentKind {
    ContentKind::IconLibrary
  }

  async fn load(&self, cx: &mut LoadContext<'_>) -> BuildResult<ModuleSource> {
    let output =
      optional_tool_output(cx.session, names::ICON_LIBRARY, names::command::ICON_LIBRARY).await;
    let body = output.map(|json| match parse_json("icon library", json.trim()) {
      Ok(value) => json_module(&value),
      Err(err) => {
        cx.session.report(&err);
        json_module(&serde_json::Value::Object(Default::default()))
      }
    });
    cx.emit(
      ContentKind::IconLibrary,
      names::stem_of(names::ICON_LIBRARY),
      body,
    )
    .await
  }
}

/// One icon compiled into a component. Needs the template transform; there is no fallback for it.
#[derive(Debug)]
pub struct Icon;

pub fn icon_template(svg: &str) -> String {
  format!("<template>\n{}\n</template>\n", svg.trim())
}

#[async_trait::async_trait]
impl Producer for Icon {
  fn kind(&self) -> ContentKind {
    ContentKind::Icon
  }

  async fn load(&self, cx: &mut LoadContext<'_>) -> BuildResult<ModuleSource> {
    let name = file_segment(cx.requested(), names::ICON_PREFIX)?.to_string();
    let transform = cx.session.transform().await.ok_or_else(|| {
      Error::missing_capability(
        cx.session.options().template_transform.clone(),
        cx.requested(),
      )
    })?;

    let requested = cx.requested().to_string();
    let args = [names::command::ICON, name.as_str()];
    let Some(svg) = optional_tool_output(cx.session, &requested, &args).await else {
      return cx.emit(ContentKind::Icon, &format!("icons/{name}"), None).await;
    };

    let body = match transform
      .transform(&icon_template(&svg), cx.id.id(), cx.mode.is_ssr)
      .await
    {
      Ok(code) => Some(ModuleSource::new(code)),
      Err(err) => {
        cx.session
          .report_verbose(&Error::transform_failed(cx.requested(), err))
          .await;
        None
      }
    };
    cx.emit(ContentKind::Icon, &format!("icons/{name}"), body).await
  }
}
