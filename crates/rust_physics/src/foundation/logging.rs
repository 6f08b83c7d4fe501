//! Logging utilities
//!
//! The library only emits through the `log` facade. Binaries call [`init`]
//! once to install `env_logger` (controlled through `RUST_LOG`).

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize logging with a fallback filter when `RUST_LOG` is unset
pub fn init_with_default(filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}
