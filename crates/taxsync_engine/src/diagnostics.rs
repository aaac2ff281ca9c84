//! Diagnostics sinks for reconciliation events.

use parking_lot::Mutex;
use std::fmt;

/// Severity tag of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticLevel {
    /// The remote service confirmed the customer.
    Success,
    /// The primary operation was rejected and the opposite one is attempted.
    Fallback,
    /// The event ended without confirmation, or bookkeeping failed.
    Error,
}

impl DiagnosticLevel {
    /// Returns the tag name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticLevel::Success => "success",
            DiagnosticLevel::Fallback => "fallback",
            DiagnosticLevel::Error => "error",
        }
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consumer of reconciliation diagnostics.
///
/// Sinks are passed to each reconciliation call rather than configured
/// globally, so one reconciler can report to different destinations.
pub trait DiagnosticsSink {
    /// Emits one diagnostic.
    fn emit(&self, level: DiagnosticLevel, message: &str);
}

/// Forwards diagnostics to `tracing` under the `taxsync::customer` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, level: DiagnosticLevel, message: &str) {
        match level {
            DiagnosticLevel::Success => {
                tracing::info!(target: "taxsync::customer", tag = level.as_str(), "{message}")
            }
            DiagnosticLevel::Fallback => {
                tracing::warn!(target: "taxsync::customer", tag = level.as_str(), "{message}")
            }
            DiagnosticLevel::Error => {
                tracing::error!(target: "taxsync::customer", tag = level.as_str(), "{message}")
            }
        }
    }
}

/// Discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn emit(&self, _level: DiagnosticLevel, _message: &str) {}
}

/// A recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Level.
    pub level: DiagnosticLevel,
    /// Message.
    pub message: String,
}

/// Records diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded diagnostics.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    /// Returns the levels of all recorded diagnostics, in order.
    pub fn levels(&self) -> Vec<DiagnosticLevel> {
        self.events.lock().iter().map(|d| d.level).collect()
    }

    /// Clears recorded diagnostics.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl DiagnosticsSink for MemorySink {
    fn emit(&self, level: DiagnosticLevel, message: &str) {
        self.events.lock().push(Diagnostic {
            level,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(DiagnosticLevel::Fallback, "first");
        sink.emit(DiagnosticLevel::Success, "second");

        assert_eq!(
            sink.levels(),
            vec![DiagnosticLevel::Fallback, DiagnosticLevel::Success]
        );
        assert_eq!(sink.events()[1].message, "second");

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn level_names() {
        assert_eq!(DiagnosticLevel::Success.to_string(), "success");
        assert_eq!(DiagnosticLevel::Fallback.as_str(), "fallback");
        assert_eq!(DiagnosticLevel::Error.as_str(), "error");
    }

    #[test]
    fn tracing_and_null_sinks_accept_events() {
        TracingSink.emit(DiagnosticLevel::Error, "nothing listening");
        NullSink.emit(DiagnosticLevel::Success, "dropped");
    }
}
