//! Logging sink for reconciliation passes
//!
//! The reconciler never prints. Progress, conflicts and recoverable failures
//! go through a [`Logger`] supplied by the caller; [`TracingLogger`] forwards
//! them to `tracing`.

use std::fmt::{self, Display, Formatter};

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Per-record detail
    Debug,
    /// Progress
    Info,
    /// Recovered anomaly
    Warn,
    /// Conflict or failed asset
    Error,
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Leveled text sink
pub trait Logger: Send + Sync {
    /// Emit one message
    fn log(&self, level: Level, message: &str);

    /// Emit at debug level
    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    /// Emit at info level
    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Emit at warn level
    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    /// Emit at error level
    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Forwards to the `tracing` macros under the `imglib` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Debug => tracing::debug!(target: "imglib", "{message}"),
            Level::Info => tracing::info!(target: "imglib", "{message}"),
            Level::Warn => tracing::warn!(target: "imglib", "{message}"),
            Level::Error => tracing::error!(target: "imglib", "{message}"),
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str) {}
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(&self, level: Level, message: &str) {
        (**self).log(level, message);
    }
}

impl<L: Logger + ?Sized> Logger for std::sync::Arc<L> {
    fn log(&self, level: Level, message: &str) {
        (**self).log(level, message);
    }
}
