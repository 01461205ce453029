//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Reads the filter from `RUST_LOG`. Safe to call more than once; later
/// calls leave the installed logger in place and report that at trace level.
pub fn init() {
    if let Err(e) = env_logger::try_init() {
        log::trace!("Logger already initialized: {}", e);
    }
}

/// Initialize logging with a default filter used when `RUST_LOG` is unset
pub fn init_with_default(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        log::trace!("Logger already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_keeps_first_logger() {
        init_with_default("info");
        let level = log::max_level();

        init();
        init_with_default("trace");
        assert_eq!(log::max_level(), level);
        info!("logging still works after repeated init");
    }
}
