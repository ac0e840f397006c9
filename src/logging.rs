//! Log output for the LawEase server and CLI.
//!
//! Events go to the terminal and to a log file at the same time. The file is
//! `LAWEASE_LOG_FILE` when set, else `logs/lawease.log`; writes to it go through a background
//! worker so a slow disk never holds up a chat or upload request.
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. Call once, before the first request is served.
///
/// `RUST_LOG` picks the level (`info` when unset, `lawease=debug` shows prompt sizes and
/// routing signals). If the log file cannot be opened the server still starts, logging to the
/// terminal only.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let terminal = fmt::layer().with_target(false).compact();
    let file = log_file_writer().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(terminal)
        .with(file)
        .init();
}

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "lawease.log";

/// Writer for the log file, or `None` when it cannot be opened.
fn log_file_writer() -> Option<NonBlocking> {
    let (writer, guard) = match std::env::var("LAWEASE_LOG_FILE") {
        Ok(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| eprintln!("Failed to open log file {path}: {err}"))
                .ok()?;
            tracing_appender::non_blocking(file)
        }
        Err(_) => {
            std::fs::create_dir_all(DEFAULT_LOG_DIR)
                .map_err(|err| eprintln!("Failed to create {DEFAULT_LOG_DIR} directory: {err}"))
                .ok()?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(
                DEFAULT_LOG_DIR,
                DEFAULT_LOG_FILE,
            ))
        }
    };
    // The guard flushes on drop, so it lives for the rest of the process.
    let _ = LOG_GUARD.set(guard);
    Some(writer)
}

/// Open a span for a single assistant request.
///
/// Every flow (chat, summarize, translate, upload) runs inside one of these so that the
/// classifier decision, transport attempts, and the final outcome share a `request_id`.
pub fn request_span(flow: &'static str, session: &str) -> tracing::Span {
    let request_id = uuid::Uuid::new_v4();
    tracing::info_span!("request", flow, session, request_id = %request_id)
}

#[cfg(test)]
mod tests {
    use super::request_span;

    #[test]
    fn request_span_can_be_entered_without_subscriber() {
        let span = request_span("chat", "default");
        let _guard = span.enter();
        tracing::info!("inside request span");
    }
}
