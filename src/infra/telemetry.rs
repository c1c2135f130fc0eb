//! Logging setup. Installs the global `tracing` subscriber once at startup.

use std::io::Write;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "granja_api=info,tower_http=info";

/// Flushes buffered log output when dropped at shutdown.
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }
}

/// `RUST_LOG` overrides the default filter. `LOG_FORMAT=json` switches to structured output.
pub fn init() -> TelemetryGuard {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    TelemetryGuard { _private: () }
}
