use std::path::Path;

use balafon_common::ModuleSource;

#[derive(Debug, Clone)]
pub struct ResolveArgs<'a> {
  pub importer: Option<&'a str>,
  pub specifier: &'a str,
}

#[derive(Debug, Clone)]
pub struct LoadArgs<'a> {
  pub id: &'a str,
}

#[derive(Debug, Clone)]
pub struct HotUpdateArgs<'a> {
  pub file: &'a Path,
}

pub type LoadOutput = balafon_error::Result<Option<ModuleSource>>;
