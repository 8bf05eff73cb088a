use log::warn;
use std::fmt::Display;
use std::sync::Mutex;

/// A recoverable oddity found while scoring. Computation continues with a
/// well-defined fallback value.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Diagnostic {
    /// The rank was outside of `[1, total]` and got clamped.
    RankOutOfRange {
        rank: i64,
        total: i64,
        name: Option<String>,
    },
    /// The contest type has no coefficient. The result contributes nothing.
    UnknownContestType { kind: String, name: Option<String> },
    /// The decay coefficient of the year is too large to be represented. It saturates.
    DecayOverflow { year: i32 },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::RankOutOfRange { rank, total, name } => write!(
                f,
                "odd rank {} / {} (from {}), clamped",
                rank,
                total,
                name.as_deref().unwrap_or("<unknown>")
            ),
            Diagnostic::UnknownContestType { kind, name } => write!(
                f,
                "unknown contest type {:?} (from {}), not counted",
                kind,
                name.as_deref().unwrap_or("<unknown>")
            ),
            Diagnostic::DecayOverflow { year } => {
                write!(f, "decay coefficient overflow for year {}, saturated", year)
            }
        }
    }
}

/// Receives the diagnostics emitted by the engines.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to the `log` facade as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
    }
}

/// Logs every diagnostic and keeps it for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    seen: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> CollectingSink {
        CollectingSink::default()
    }

    /// A copy of the diagnostics reported so far, in order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Removes and returns the diagnostics reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(
            &mut *self
                .seen
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.report(Diagnostic::UnknownContestType {
            kind: "x".to_string(),
            name: None,
        });
        sink.report(Diagnostic::RankOutOfRange {
            rank: 0,
            total: 3,
            name: Some("Anna".to_string()),
        });
        let seen = sink.take();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], Diagnostic::UnknownContestType { .. }));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn display_names_the_contestant() {
        let d = Diagnostic::RankOutOfRange {
            rank: 12,
            total: 10,
            name: Some("Anna".to_string()),
        };
        assert_eq!(d.to_string(), "odd rank 12 / 10 (from Anna), clamped");
    }
}
