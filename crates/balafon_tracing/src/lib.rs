use std::sync::atomic::AtomicBool;

use tracing::Level;

static IS_INIT: AtomicBool = AtomicBool::new(false);

pub const LOG_ENV: &str = "BALAFON_LOG";

/// Installs a subscriber when `BALAFON_LOG` is set, e.g. `BALAFON_LOG=balafon=debug`.
pub fn enable_tracing_on_demand() {
  if std::env::var_os(LOG_ENV).is_some() {
    init();
  }
}

pub fn init() {
  use tracing_subscriber::{fmt, prelude::*, EnvFilter};
  if !IS_INIT.swap(true, std::sync::atomic::Ordering::SeqCst) {
    let _ = tracing_subscriber::registry()
      .with(fmt::layer())
      .with(EnvFilter::from_env(LOG_ENV))
      .with(
        tracing_subscriber::filter::Targets::new().with_targets(vec![("balafon", Level::TRACE)]),
      )
      .try_init();
  }
}
