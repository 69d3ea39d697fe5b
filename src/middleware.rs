//! Ready-made layers.

mod logging;
mod recover;

pub use logging::LoggingMiddleware;
pub use recover::{RecoverMiddleware, recover};
