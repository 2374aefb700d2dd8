use std::sync::Arc;

use ansi_term::Color;
use balafon_error::Error;

/// Receives every recoverable failure of a session.
pub type WarningHandler = Arc<dyn Fn(&Error) + Send + Sync>;

/// Prints warnings to stderr, whether or not tracing is enabled.
pub fn default_warning_handler() -> WarningHandler {
  Arc::new(|err: &Error| {
    eprintln!("{}", warning_line(err));
  })
}

fn tag() -> String {
  Color::Blue.bold().paint("[balafon]").to_string()
}

fn readable(err: &Error) -> String {
  match std::env::current_dir() {
    Ok(cwd) => err.to_readable_string(cwd),
    Err(_) => err.to_string(),
  }
}

/// `[balafon] <CODE> <message>`
pub fn warning_line(err: &Error) -> String {
  format!(
    "{} {} {}",
    tag(),
    Color::Yellow.paint(err.kind.code()),
    readable(err)
  )
}

pub fn announce(what: &str) {
  tracing::info!("{} {}", tag(), Color::Green.paint(what));
}
