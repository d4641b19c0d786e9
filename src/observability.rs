//! Structured logging setup.
//!
//! Logging is controlled by the `RUST_LOG` environment variable and
//! defaults to `warn`. The analysis core never logs from inside pure
//! computation; detectors surface anomalies as result warnings and the
//! shell decides what to print.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Default level is `warn`; raise with e.g. `RUST_LOG=gaze=debug`.
/// Output goes to stderr so report output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
