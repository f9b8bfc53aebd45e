//! Logging setup based on `tracing-subscriber`.

/// Default filter used by [`init`].
pub const DEFAULT_FILTER: &str = "info,terrane_core=debug,terrane_geometry=debug,terrane=debug";

/// Install a formatting subscriber with the default filter.
///
/// `RUST_LOG` is not consulted; use [`init_with_filter`] to override.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Install a formatting subscriber with a custom env-filter directive.
///
/// Calling this more than once is harmless: later calls are ignored.
pub fn init_with_filter(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
