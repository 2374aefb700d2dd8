use std::path::{Path, PathBuf};

use balafon_common::{ContentKind, EmitReference, ModuleSource, RewriteKind};
use balafon_error::Error;
use futures::future::join_all;

use super::{file_segment, json_module, parse_json};
use crate::{
  emission::self_invoking_import,
  names,
  utils::{export_name, js_string, make_legal},
  BuildResult, BuildSession, LoadContext, Producer,
};

/// One `<locale>.json` file under the i18n root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFile {
  /// `en-US` for `en-US.json`
  pub name: String,
  pub path: PathBuf,
}

impl LocaleFile {
  pub fn file_name(&self) -> String {
    format!("{}.json", self.name)
  }

  fn local(&self) -> String {
    make_legal(&self.name)
  }
}

/// Locale files of `dir`, sorted by name. A missing directory has no locales.
pub async fn list_locales(dir: &Path) -> BuildResult<Vec<LocaleFile>> {
  let mut entries = match tokio::fs::read_dir(dir).await {
    Ok(entries) => entries,
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
    Err(err) => return Err(Error::read_template_failed(dir, err)),
  };
  let mut locales = vec![];
  while let Some(entry) = entries
    .next_entry()
    .await
    .map_err(|e| Error::read_template_failed(dir, e))?
  {
    let path = entry.path();
    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
      continue;
    }
    if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
      locales.push(LocaleFile {
        name: name.to_string(),
        path,
      });
    }
  }
  locales.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(locales)
}

async fn i18n_dir(session: &BuildSession) -> Option<PathBuf> {
  let root = session.options().i18n_root.as_ref()?;
  Some(session.project_path(root).await)
}

async fn read_locale(path: &Path) -> BuildResult<String> {
  tokio::fs::read_to_string(path)
    .await
    .map_err(|e| Error::read_template_failed(path, e))
}

async fn parse_locale(name: &str, path: &Path) -> BuildResult<serde_json::Value> {
  parse_json(&format!("locale {name}"), &read_locale(path).await?)
}

/// The locale map `virtual:balafon/i18n.js`.
///
/// Each locale is exported under its own name, plus a default export mapping every name to its module.
#[derive(Debug)]
pub struct I18nBundle;

impl I18nBundle {
  /// Production browser builds: every locale is its own chunk, imported when the map is first evaluated.
  ///
  /// A locale that cannot be read or parsed gets no chunk; it is an empty namespace inline.
  async fn deferred(cx: &mut LoadContext<'_>, locales: &[LocaleFile]) -> BuildResult<String> {
    let values = join_all(
      locales
        .iter()
        .map(|locale| parse_locale(&locale.name, &locale.path)),
    )
    .await;
    let mut code = String::new();
    for (locale, value) in locales.iter().zip(values) {
      let value = match value {
        Ok(value) => value,
        Err(err) => {
          cx.session.report(&err);
          code.push_str(&format!("const {} = {{ default: {{}} }};\n", locale.local()));
          continue;
        }
      };
      let file_ref = cx
        .emit_chunk(&format!("i18n/{}", locale.name), json_module(&value))
        .await;
      cx.session
        .push_reference(EmitReference::new(file_ref.clone(), RewriteKind::AwaitOnly))
        .await;
      code.push_str(&format!(
        "const {} = {};\n",
        locale.local(),
        self_invoking_import(&file_ref)
      ));
    }
    Ok(code)
  }

  fn eager(locales: &[LocaleFile]) -> String {
    locales
      .iter()
      .map(|locale| {
        format!(
          "import * as {} from {};\n",
          locale.local(),
          js_string(&format!("{}{}", names::LOCALE_PREFIX, locale.file_name()))
        )
      })
      .collect()
  }
}

/// The export statements shared by both representations of the locale map.
pub fn locale_exports(locales: &[LocaleFile]) -> String {
  let mut code = String::new();
  for locale in locales {
    let local = locale.local();
    let exported = export_name(&locale.name);
    if local == exported {
      code.push_str(&format!("export {{ {local} }};\n"));
    } else {
      code.push_str(&format!("export {{ {local} as {exported} }};\n"));
    }
  }
  let entries = locales
    .iter()
    .map(|locale| format!("{}: {}", export_name(&locale.name), locale.local()))
    .collect::<Vec<_>>();
  if entries.is_empty() {
    code.push_str("export default {};\n");
  } else {
    code.push_str(&format!("export default {{ {} }};\n", entries.join(", ")));
  }
  code
}

#[async_trait::async_trait]
impl Producer for I18nBundle {
  fn kind(&self) -> ContentKind {
    ContentKind::I18n
  }

  async fn load(&self, cx: &mut LoadContext<'_>) -> BuildResult<ModuleSource> {
    let locales = match i18n_dir(cx.session).await {
      Some(dir) => list_locales(&dir).await?,
      None => vec![],
    };
    tracing::debug!("{} locale(s) found", locales.len());

    let mut code = if cx.mode.is_production && !cx.mode.is_ssr {
      Self::deferred(cx, &locales).await?
    } else {
      Self::eager(&locales)
    };
    code.push_str(&locale_exports(&locales));
    Ok(ModuleSource::new(code))
  }
}

/// A single locale, `virtual:balafon/i18n/<locale>.json`.
#[derive(Debug)]
pub struct Locale;

#[async_trait::async_trait]
impl Producer for Locale {
  fn kind(&self) -> ContentKind {
    ContentKind::Locale
  }

  async fn load(&self, cx: &mut LoadContext<'_>) -> BuildResult<ModuleSource> {
    let file = file_segment(cx.requested(), names::LOCALE_PREFIX)?.to_string();
    let stem = file.strip_suffix(".json").unwrap_or(&file).to_string();
    let Some(dir) = i18n_dir(cx.session).await else {
      cx.session.report(&Error::invalid_option(
        "i18nRoot",
        format!("is required to load \"{}\"", cx.requested()),
      ));
      return Ok(ModuleSource::null_stub());
    };
    let path = dir.join(&file);
    cx.watch(&path).await;

    // unreadable is a null export, malformed is an empty object
    let body = match read_locale(&path).await {
      Ok(text) => match parse_json(&format!("locale {stem}"), &text) {
        Ok(value) => Some(json_module(&value)),
        Err(err) => {
          cx.session.report(&err);
          Some(json_module(&serde_json::Value::Object(Default::default())))
        }
      },
      Err(err) => {
        cx.session.report(&err);
        None
      }
    };
    cx.emit(ContentKind::Locale, &format!("i18n/{stem}"), body).await
  }
}
