//! User-space specifiers this engine claims, and the tool commands behind them.

pub const CORE_SCRIPT: &str = "virtual:balafon/core.js";
pub const CORE_STYLESHEET: &str = "virtual:balafon/core.css.js";
pub const ICON_LIBRARY: &str = "virtual:balafon/icons.js";
pub const I18N: &str = "virtual:balafon/i18n.js";
pub const SETTINGS: &str = "virtual:balafon/settings.js";

pub const ICON_PREFIX: &str = "virtual:balafon/icons/";
pub const LOCALE_PREFIX: &str = "virtual:balafon/i18n/";
pub const SSR_COMPONENT_PREFIX: &str = "virtual:balafon/ssr/";

pub mod command {
  pub const ENV: &[&str] = &["--vite:env"];
  pub const CORE_SCRIPT: &[&str] = &["--js:dist"];
  pub const CORE_STYLESHEET: &[&str] = &["--css:dist"];
  pub const ICON_LIBRARY: &[&str] = &["--vite:icons"];
  pub const ICON: &str = "--vite:icon";

  pub fn args(command: &[&str]) -> Vec<String> {
    command.iter().map(|arg| arg.to_string()).collect()
  }
}

/// Id of a chunk or asset emitted for `stem`, e.g. `balafon/core.js`.
pub fn emitted_name(prefix: &str, stem: &str) -> String {
  format!("{prefix}/{stem}.js")
}

/// Strips the extension and any directories off a requested id, `virtual:balafon/core.css.js` -> `core.css`.
pub fn stem_of(requested: &str) -> &str {
  let file = requested.rsplit('/').next().unwrap_or(requested);
  file.strip_suffix(".js").unwrap_or(file)
}
