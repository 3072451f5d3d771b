use tracing_subscriber::EnvFilter;

use crate::config::RuntimeMode;

/// Install the global subscriber. `RUST_LOG` overrides the mode default.
pub fn init_tracing(mode: RuntimeMode) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(mode)));

    match mode {
        RuntimeMode::Development => tracing_subscriber::fmt().with_env_filter(filter).init(),
        RuntimeMode::Production => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

fn default_directive(mode: RuntimeMode) -> &'static str {
    if mode.is_development() {
        "rentloop=debug,info"
    } else {
        "info"
    }
}
