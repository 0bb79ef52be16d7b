//! Logging initialisation and the log-transport capability.
//!
//! Console output goes through `tracing`; the transport seam exists for
//! hosts that forward structured entries to an external sink. The emitter is
//! an explicit capability handed to call sites, never a process-wide proxy.

use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    Layer, filter::FilterFn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Initialise the global `tracing` subscriber.
///
/// The level comes from the `LOG_LEVEL` environment variable, defaulting to
/// `TRACE` in debug builds and `INFO` otherwise. Only events from herald
/// crates are emitted.
pub fn init() {
    let default = if cfg!(debug_assertions) {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };

    let level = std::env::var("LOG_LEVEL").map_or(default, |level| {
        LevelFilter::from_str(level.as_str()).unwrap_or_else(|_| {
            eprintln!("Invalid log level specified {level}, defaulting to {default}");
            default
        })
    });

    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(true)
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_filter(level)
                .with_filter(FilterFn::new(|metadata| {
                    metadata.target().starts_with("herald")
                })),
        )
        .init();
}

/// Level classification for a structured log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
    Trace,
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Debug => "debug",
            Self::Trace => "trace",
        })
    }
}

/// A structured entry handed to a log transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

impl LogEntry {
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Outbound transport for structured log entries.
///
/// `send` reports whether the entry was accepted; `flush` drains anything
/// buffered before process exit.
#[async_trait]
pub trait LogTransport: Send + Sync {
    async fn send(&self, entry: LogEntry) -> bool;

    async fn flush(&self);
}

/// Forwards entries to a [`LogTransport`] and guarantees the transport is
/// flushed at most once, so it is safe to flush from both the normal
/// completion path and an abnormal-exit path.
pub struct TransportLogger {
    transport: Arc<dyn LogTransport>,
    flushed: AtomicBool,
}

impl TransportLogger {
    #[must_use]
    pub fn new(transport: Arc<dyn LogTransport>) -> Self {
        Self {
            transport,
            flushed: AtomicBool::new(false),
        }
    }

    /// Forward an entry, reporting whether the transport accepted it.
    /// Rejected entries are surfaced on the console rather than lost.
    pub async fn emit(&self, entry: LogEntry) -> bool {
        let accepted = self.transport.send(entry.clone()).await;
        if !accepted {
            tracing::warn!(level = %entry.level, message = entry.message, "Log transport rejected entry");
        }
        accepted
    }

    /// Drain the transport. Repeated calls are no-ops.
    pub async fn flush(&self) {
        if self.flushed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.transport.flush().await;
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use async_trait::async_trait;

    use super::{Level, LogEntry, LogTransport, TransportLogger};

    #[derive(Default)]
    struct CountingTransport {
        sent: AtomicU32,
        flushes: AtomicU32,
    }

    #[async_trait]
    impl LogTransport for CountingTransport {
        async fn send(&self, _entry: LogEntry) -> bool {
            self.sent.fetch_add(1, Ordering::SeqCst);
            true
        }

        async fn flush(&self) {
            self.flushes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn entries_reach_the_transport() {
        let transport = Arc::new(CountingTransport::default());
        let logger = TransportLogger::new(Arc::clone(&transport) as Arc<dyn LogTransport>);

        assert!(logger.emit(LogEntry::new(Level::Info, "hello")).await);
        assert_eq!(transport.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn flush_runs_exactly_once() {
        let transport = Arc::new(CountingTransport::default());
        let logger = TransportLogger::new(Arc::clone(&transport) as Arc<dyn LogTransport>);

        logger.flush().await;
        logger.flush().await;

        assert_eq!(transport.flushes.load(Ordering::SeqCst), 1);
    }
}
