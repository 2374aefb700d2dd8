use balafon_common::{ContentKind, ModuleSource};
use balafon_error::Error;

use super::file_segment;
use crate::{names, BuildResult, LoadContext, Producer};

/// A component template from the components directory, compiled by the host's template transform.
#[derive(Debug)]
pub struct SsrComponent;

impl SsrComponent {
  async fn compile(cx: &mut LoadContext<'_>, name: &str) -> BuildResult<Option<ModuleSource>> {
    let session = cx.session;
    let options = session.options();
    let Some(dir) = options.components_dir.as_ref() else {
      return Err(Error::invalid_option(
        "componentsDir",
        format!("is required to load \"{}\"", cx.requested()),
      ));
    };
    let path = session
      .project_path(&dir.join(format!("{name}{}", options.component_extension)))
      .await;
    cx.watch(&path).await;

    let source = tokio::fs::read_to_string(&path)
      .await
      .map_err(|e| Error::read_template_failed(&path, e))?;
    if source.trim().is_empty() {
      return Ok(None);
    }
    let Some(transform) = session.transform().await else {
      return Err(Error::missing_capability(
        options.template_transform.clone(),
        cx.requested(),
      ));
    };
    let id = path.to_string_lossy();
    let code = transform
      .transform(&source, &id, cx.mode.is_ssr)
      .await
      .map_err(|e| Error::transform_failed(cx.requested(), e))?;
    Ok(Some(ModuleSource::new(code)))
  }
}

#[async_trait::async_trait]
impl Producer for SsrComponent {
  fn kind(&self) -> ContentKind {
    ContentKind::SsrComponent
  }

  /// Unlike icons, a component that cannot be compiled degrades to a null export.
  async fn load(&self, cx: &mut LoadContext<'_>) -> BuildResult<ModuleSource> {
    let name = file_segment(cx.requested(), names::SSR_COMPONENT_PREFIX)?.to_string();
    let body = match Self::compile(cx, &name).await {
      Ok(body) => body,
      Err(err) => {
        cx.session.report_verbose(&err).await;
        None
      }
    };
    cx.emit(ContentKind::SsrComponent, &format!("ssr/{name}"), body)
      .await
  }
}
