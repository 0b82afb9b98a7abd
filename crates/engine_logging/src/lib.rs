#![deny(missing_docs)]
//! Logging macros shared by the linkcheck crates.
//!
//! The `engine_*` macros forward to the `log` facade, so every caller needs
//! `log` among its own dependencies. [`initialize_for_tests`] installs a
//! terminal logger once per test binary.

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Level used for a run: `Debug` when verbose output was asked for, else `Info`.
pub fn run_level(verbose: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Installs a terminal logger for tests: `Debug` in debug builds, `Info` in
/// release builds.
///
/// Safe to call from every test; only the first call installs anything.
pub fn initialize_for_tests() {
    initialize_for_tests_at(run_level(cfg!(debug_assertions)));
}

/// Like [`initialize_for_tests`] with an explicit level.
pub fn initialize_for_tests_at(level: log::LevelFilter) {
    use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode};

    let config = ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("rustls")
        .build();

    // A second call finds the logger already set.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
