//! Awaits the lazy imports wrapper modules left in the output, once file names are final.

use std::borrow::Cow;

use balafon_common::EmitReference;
use balafon_error::Error;
use balafon_plugin::{relative_url, ModuleFormat, OutputBundle, PluginContext};
use fancy_regex::Regex;
use tracing::instrument;

use crate::BuildResult;

/// A reference with its emitted file name resolved.
#[derive(Debug, Clone)]
pub struct ResolvedReference {
  pub reference: EmitReference,
  pub file_name: String,
}

/// Rewrites `code` of the output file `importer` for a single reference.
///
/// Calls that are already awaited are left alone, so running this twice changes nothing.
pub fn rewrite_code<'a>(
  code: &'a str,
  importer: &str,
  resolved: &ResolvedReference,
) -> BuildResult<Cow<'a, str>> {
  let url = relative_url(importer, &resolved.file_name);
  let pattern = resolved.reference.pattern_for(&fancy_regex::escape(&url));
  let regex =
    Regex::new(&pattern).map_err(|e| Error::invalid_rewrite_pattern(pattern.clone(), e))?;
  regex
    .try_replacen(code, 0, resolved.reference.replacement.as_str())
    .map_err(|e| Error::invalid_rewrite_pattern(pattern, e))
}

/// Resolves every reference through the host, in registration order. An unknown reference is fatal.
pub fn resolve_references(
  ctx: &dyn PluginContext,
  references: Vec<EmitReference>,
) -> BuildResult<Vec<ResolvedReference>> {
  references
    .into_iter()
    .map(|reference| {
      let file_name = ctx.get_file_name(&reference.file_ref)?;
      Ok(ResolvedReference {
        reference,
        file_name,
      })
    })
    .collect()
}

#[instrument(skip_all)]
pub fn rewrite_bundle(
  format: ModuleFormat,
  references: &[ResolvedReference],
  bundle: &mut OutputBundle,
) -> BuildResult<()> {
  if !format.is_es() || references.is_empty() {
    return Ok(());
  }
  for chunk in bundle.chunks_mut() {
    let mut changed = false;
    let mut code = std::mem::take(&mut chunk.code);
    for resolved in references {
      if let Cow::Owned(rewritten) = rewrite_code(&code, &chunk.file_name, resolved)? {
        code = rewritten;
        changed = true;
      }
    }
    if changed {
      tracing::debug!("awaited lazy imports in {}", chunk.file_name);
    }
    chunk.code = code;
  }
  Ok(())
}
