//! Logger setup for binaries embedding the crate.
//!
//! The library only talks to the `log` facade. Binaries call [`init`] once;
//! the filter comes from `RUST_LOG` and falls back to `info`.

use env_logger::{Builder, Env};

pub const DEFAULT_FILTER: &str = "info";

pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Installs `env_logger`, using `filter` when `RUST_LOG` is unset. Calling it
/// again after a logger is installed is a no-op.
pub fn init_with_default(filter: &str) {
    let _ = Builder::from_env(Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init();
}
