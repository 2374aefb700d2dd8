/// Snapshot of the build established once in `config_resolved`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildMode {
  pub is_production: bool,
  pub is_ssr: bool,
}

impl BuildMode {
  pub fn development() -> Self {
    Self {
      is_production: false,
      is_ssr: false,
    }
  }

  pub fn production() -> Self {
    Self {
      is_production: true,
      is_ssr: false,
    }
  }

  pub fn with_ssr(mut self, is_ssr: bool) -> Self {
    self.is_ssr = is_ssr;
    self
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
  CoreScript,
  CoreStylesheet,
  IconLibrary,
  Icon,
  I18n,
  Locale,
  SsrComponent,
  Settings,
}

impl ContentKind {
  /// Content that touches `document`/`window` and must never run server-side.
  pub fn is_browser_only(self) -> bool {
    matches!(self, ContentKind::CoreScript | ContentKind::CoreStylesheet)
  }

  /// Whether production builds may move this content into its own chunk or asset.
  pub fn is_deferrable(self) -> bool {
    matches!(
      self,
      ContentKind::CoreScript
        | ContentKind::CoreStylesheet
        | ContentKind::IconLibrary
        | ContentKind::Locale
        | ContentKind::SsrComponent
    )
  }

  pub fn as_str(self) -> &'static str {
    match self {
      ContentKind::CoreScript => "core-script",
      ContentKind::CoreStylesheet => "core-stylesheet",
      ContentKind::IconLibrary => "icon-library",
      ContentKind::Icon => "icon",
      ContentKind::I18n => "i18n",
      ContentKind::Locale => "locale",
      ContentKind::SsrComponent => "ssr-component",
      ContentKind::Settings => "settings",
    }
  }
}
