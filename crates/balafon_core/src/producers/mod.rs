use std::sync::Arc;

use balafon_common::ModuleSource;
use balafon_error::Error;

use crate::{
  names::{self, command},
  BuildResult, BuildSession, ProducerRegistry,
};

mod core_script;
pub use core_script::CoreScript;
mod core_stylesheet;
pub use core_stylesheet::CoreStylesheet;
mod icons;
pub use icons::{Icon, IconLibrary};
mod i18n;
pub use i18n::{I18nBundle, Locale};
mod settings;
pub use settings::Settings;
mod ssr_component;
pub use ssr_component::SsrComponent;

impl ProducerRegistry {
  pub fn with_builtin_producers() -> Self {
    let mut registry = Self::default();
    registry.register(names::CORE_SCRIPT, Arc::new(CoreScript));
    registry.register(names::CORE_STYLESHEET, Arc::new(CoreStylesheet));
    registry.register(names::ICON_LIBRARY, Arc::new(IconLibrary));
    registry.register(names::I18N, Arc::new(I18nBundle));
    registry.register(names::SETTINGS, Arc::new(Settings));
    registry.register_prefix(names::ICON_PREFIX, Arc::new(Icon));
    registry.register_prefix(names::LOCALE_PREFIX, Arc::new(Locale));
    registry.register_prefix(names::SSR_COMPONENT_PREFIX, Arc::new(SsrComponent));
    registry
  }
}

/// Stdout of a tool command, `None` when it printed nothing but whitespace.
pub(crate) async fn tool_output(
  session: &BuildSession,
  args: &[&str],
) -> BuildResult<Option<String>> {
  let stdout = session.run_tool(&command::args(args)).await?;
  Ok((!stdout.trim().is_empty()).then_some(stdout))
}

/// Like [tool_output], but a failure is reported and treated as empty output.
pub(crate) async fn optional_tool_output(
  session: &BuildSession,
  requested: &str,
  args: &[&str],
) -> Option<String> {
  match tool_output(session, args).await {
    Ok(output) => output,
    Err(err) => {
      session.report(&err.context(format!("producing \"{requested}\"")));
      None
    }
  }
}

/// The part of a prefixed id after its prefix, refusing anything that would leave its directory.
pub(crate) fn file_segment<'a>(requested: &'a str, prefix: &str) -> BuildResult<&'a str> {
  let segment = requested.strip_prefix(prefix).unwrap_or(requested);
  if segment.is_empty()
    || segment.contains('\\')
    || segment.split('/').any(|part| part.is_empty() || part == "." || part == "..")
  {
    return Err(Error::invalid_option(
      "specifier",
      format!("\"{requested}\" does not name a file"),
    ));
  }
  Ok(segment)
}

pub(crate) fn parse_json(what: &str, text: &str) -> BuildResult<serde_json::Value> {
  serde_json::from_str(text).map_err(|e| Error::malformed_tool_output(what.to_string(), e))
}

/// `value` as the default export.
pub(crate) fn json_module(value: &serde_json::Value) -> ModuleSource {
  ModuleSource::new(format!("export default {};\n", crate::utils::js_value(value)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_segments_stay_inside_their_directory() {
    assert_eq!(
      file_segment("virtual:balafon/ssr/Card", names::SSR_COMPONENT_PREFIX).unwrap(),
      "Card"
    );
    assert_eq!(
      file_segment("virtual:balafon/ssr/forms/Input", names::SSR_COMPONENT_PREFIX).unwrap(),
      "forms/Input"
    );
    for bad in ["virtual:balafon/ssr/../secret", "virtual:balafon/ssr/a//b", "virtual:balafon/ssr/"] {
      assert!(file_segment(bad, names::SSR_COMPONENT_PREFIX).is_err(), "{bad}");
    }
  }

  #[test]
  fn json_documents_become_default_exports() {
    let value = parse_json("locale fr", r#"{"hello": "bonjour"}"#).unwrap();
    assert_eq!(json_module(&value).code, "export default {\"hello\":\"bonjour\"};\n");
    let err = parse_json("locale fr", "{ nope").unwrap_err();
    assert_eq!(err.kind.code(), balafon_error::error_code::MALFORMED_TOOL_OUTPUT);
  }
}
