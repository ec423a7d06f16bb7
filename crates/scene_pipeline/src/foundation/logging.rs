//! Logging utilities
//!
//! The library only emits through the `log` facade. Binaries pick the backend
//! by calling one of the initialisers below once at startup.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with an explicit default level
///
/// `RUST_LOG` still overrides the level when set.
pub fn init_with_level(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Route log output through the test harness; safe to call repeatedly
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
