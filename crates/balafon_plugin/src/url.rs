use std::path::Path;

use balafon_common::FileRef;
use sugar_path::SugarPath;

const FILE_URL_PREFIX: &str = "import.meta.ROLLUP_FILE_URL_";

/// The expression a module uses to point at an emitted file before names are final.
pub fn file_url(file_ref: &FileRef) -> String {
  format!("{FILE_URL_PREFIX}{file_ref}")
}

/// Reads the reference back out of a `file_url` expression found at `code[start..]`.
pub fn parse_file_url(code: &str) -> Option<(FileRef, usize)> {
  let rest = code.strip_prefix(FILE_URL_PREFIX)?;
  let len = rest
    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
    .unwrap_or(rest.len());
  (len > 0).then(|| (FileRef::new(&rest[..len]), FILE_URL_PREFIX.len() + len))
}

/// Url of `target` as seen from the output file `importer`, both relative to the output dir.
///
/// Always starts with `./` or `../`, the way rendered `new URL(.., import.meta.url)` expressions do.
pub fn relative_url(importer: &str, target: &str) -> String {
  let root = Path::new("/");
  let importer_dir = root
    .join(importer)
    .parent()
    .map(Path::to_path_buf)
    .unwrap_or_else(|| root.to_path_buf());
  let relative = root.join(target).relative(importer_dir);
  let relative = relative.to_slash_lossy();
  if relative.starts_with("../") {
    relative.into_owned()
  } else {
    format!("./{relative}")
  }
}
