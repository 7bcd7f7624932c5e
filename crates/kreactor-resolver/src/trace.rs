//! Observational events emitted while resolving.
//!
//! Events never influence results. The CLI routes them to `tracing`; tests
//! record them to assert on conflicts and filtering.

use std::fmt;

use kreactor_core::artifact::{Artifact, Scope};

/// Which set a dependency landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Reactor,
    Remote,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Reactor => f.write_str("reactor"),
            EdgeKind::Remote => f.write_str("remote"),
        }
    }
}

/// Why a dependency was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterReason {
    /// Test or provided dependency reached through another module.
    ScopeNotInherited { inherited: Scope },
    /// Optional dependency of another module.
    Optional,
    /// Matched an exclusion pattern collected along the path.
    Excluded,
    /// Type is not one of the configured library types.
    NonLibraryType,
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterReason::ScopeNotInherited { inherited } => {
                write!(f, "not inherited through {inherited} scope")
            }
            FilterReason::Optional => f.write_str("optional"),
            FilterReason::Excluded => f.write_str("excluded"),
            FilterReason::NonLibraryType => f.write_str("not a library type"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    NewDependency {
        module: String,
        dependency: Artifact,
        edge: EdgeKind,
    },
    DuplicateDependency {
        module: String,
        dependency: Artifact,
        edge: EdgeKind,
    },
    ConflictDetected {
        module: String,
        winner: Artifact,
        loser: Artifact,
        path: Vec<String>,
    },
    FilteredDependency {
        module: String,
        dependency: Artifact,
        reason: FilterReason,
    },
    /// The resolution service failed and the frontier was kept unresolved.
    ResolutionDegraded { module: String, message: String },
}

/// Receiver for [`TraceEvent`]s.
pub trait TraceSink {
    fn record(&mut self, event: TraceEvent);
}

/// Forwards events to `tracing`. Conflicts and degradation are warnings,
/// everything else is debug output.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::NewDependency {
                module,
                dependency,
                edge,
            } => tracing::debug!(%module, %dependency, %edge, "new dependency"),
            TraceEvent::DuplicateDependency {
                module,
                dependency,
                edge,
            } => tracing::debug!(%module, %dependency, %edge, "duplicate dependency"),
            TraceEvent::ConflictDetected {
                module,
                winner,
                loser,
                path,
            } => tracing::warn!(
                %module,
                kept = %winner,
                omitted = %loser,
                path = %path.join(" -> "),
                "version conflict"
            ),
            TraceEvent::FilteredDependency {
                module,
                dependency,
                reason: FilterReason::NonLibraryType,
            } => tracing::warn!(%module, %dependency, "skipping dependency that is not a library"),
            TraceEvent::FilteredDependency {
                module,
                dependency,
                reason,
            } => tracing::debug!(%module, %dependency, %reason, "omitted dependency"),
            TraceEvent::ResolutionDegraded { module, message } => {
                tracing::warn!(%module, "resolution failed, keeping unresolved dependencies: {message}")
            }
        }
    }
}

/// Keeps every event in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<TraceEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(winner, loser)` FullIds of every recorded conflict.
    pub fn conflicts(&self) -> Vec<(String, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::ConflictDetected { winner, loser, .. } => {
                    Some((winner.full_id(), loser.full_id()))
                }
                _ => None,
            })
            .collect()
    }

    /// FullIds of dependencies filtered for `reason`.
    pub fn filtered(&self, reason: &FilterReason) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::FilteredDependency {
                    dependency,
                    reason: r,
                    ..
                } if r == reason => Some(dependency.full_id()),
                _ => None,
            })
            .collect()
    }
}

impl TraceSink for RecordingSink {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&mut self, _event: TraceEvent) {}
}
