mod args;
pub use args::*;
mod plugin;
pub use plugin::*;
mod context;
pub use context::*;
mod config;
pub use config::*;
mod output;
pub use output::*;
mod url;
pub use url::*;

pub use async_trait;
