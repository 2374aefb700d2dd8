mod host;
pub use host::*;
mod driver;
pub use driver::*;
mod runner;
pub use runner::*;
mod transform;
pub use transform::*;
