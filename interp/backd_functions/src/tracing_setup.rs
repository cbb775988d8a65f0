//! Subscriber installation for embedders and tests.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "BACKD_LOG";

/// Install a `tracing` subscriber filtered by `BACKD_LOG`, falling back to
/// `RUST_LOG`. Does nothing when neither is set; later calls are no-ops.
///
/// ```text
/// BACKD_LOG=backd_eval=trace cargo test -p backd_eval
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) =
            EnvFilter::try_from_env(LOG_ENV).or_else(|_| EnvFilter::try_from_default_env())
        else {
            return;
        };
        // An embedder may already have installed a global subscriber.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .try_init();
    });
}
