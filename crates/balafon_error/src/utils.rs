use std::{borrow::Cow, path::Path};

use balafon_common::CWD;
use sugar_path::SugarPath;

pub fn format_quoted_strings(list: &[impl AsRef<str>]) -> String {
  let mut quoted_list = list
    .iter()
    .map(|item| format!("\"{}\"", item.as_ref()))
    .collect::<Vec<_>>();
  match quoted_list.pop() {
    None => String::new(),
    Some(last) if quoted_list.is_empty() => last,
    Some(last) => format!("{} and {}", quoted_list.join(", "), last),
  }
}

pub trait PathExt {
  fn may_display_relative(&self) -> Cow<str>;
}

impl PathExt for Path {
  fn may_display_relative(&self) -> Cow<str> {
    let path = if CWD.is_set() && self.is_absolute() {
      CWD.with(|cwd| self.relative(cwd))
    } else {
      return self.to_string_lossy();
    };
    Cow::Owned(path.to_slash_lossy().into_owned())
  }
}
