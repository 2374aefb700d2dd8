use balafon_common::{ContentKind, ModuleSource};
use balafon_error::Error;

use super::tool_output;
use crate::{names, utils::js_string, BuildResult, LoadContext, Producer};

/// The client runtime. Production builds cannot ship without it.
#[derive(Debug)]
pub struct CoreScript;

/// Evaluates `source` once and exports its completion value, or null when evaluation throws.
pub fn eval_wrapper(source: &str) -> String {
  format!(
    r#"let core = null;
try {{
  core = (0, eval)({});
}} catch (e) {{
  console.error("[balafon] failed to evaluate the core script", e);
}}
export default core ?? null;
"#,
    js_string(source)
  )
}

#[async_trait::async_trait]
impl Producer for CoreScript {
  fn kind(&self) -> ContentKind {
    ContentKind::CoreScript
  }

  async fn load(&self, cx: &mut LoadContext<'_>) -> BuildResult<ModuleSource> {
    // the tool reads the project environment before it can build the runtime
    cx.session.environment().await;

    let output = match tool_output(cx.session, names::command::CORE_SCRIPT).await {
      Ok(output) => output,
      Err(err) if cx.mode.is_production => {
        return Err(Error::mandatory_content(cx.requested()).context(err.to_string()));
      }
      Err(err) => {
        cx.session.report(&err.context("producing the core script"));
        None
      }
    };
    if output.is_none() && cx.mode.is_production {
      return Err(Error::mandatory_content(cx.requested()));
    }

    let body = output.map(|source| ModuleSource::new(eval_wrapper(&source)));
    cx.emit(ContentKind::CoreScript, names::stem_of(names::CORE_SCRIPT), body)
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wrapper_embeds_the_source_as_a_string() {
    insta::assert_snapshot!(eval_wrapper("window.app = \"ok\";"), @r###"
    let core = null;
    try {
      core = (0, eval)("window.app = \"ok\";");
    } catch (e) {
      console.error("[balafon] failed to evaluate the core script", e);
    }
    export default core ?? null;
    "###);
  }
}
