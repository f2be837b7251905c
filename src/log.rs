//! Logging setup
//!
//! A full-screen program cannot log to its own tty, so tracing output goes to
//! a file appender next to the process. The `QUILL_LOG` environment variable
//! carries the usual EnvFilter directives (e.g. `quill=debug`).

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Returns the appender guard; dropping it flushes pending log lines, so the
/// caller keeps it alive for the life of the process. Logging is optional:
/// when `QUILL_LOG` is unset nothing is written.
pub fn init() -> Option<WorkerGuard> {
    let filter = std::env::var("QUILL_LOG").ok()?;

    let appender = tracing_appender::rolling::never(".", "quill.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "quill starting");
    Some(guard)
}
