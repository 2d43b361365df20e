//! `tracing-subscriber` wiring, gated on verbosity the way the rest of the
//! workspace gates instrumentation behind its optional `tracing` feature.

use tracing_subscriber::EnvFilter;

/// Installs a process-global subscriber. `verbosity` is the `-v` repeat
/// count; `0` maps to `warn`, each additional `-v` drops one level, and
/// `RUST_LOG` always overrides both.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
