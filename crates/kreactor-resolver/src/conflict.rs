//! Version conflict reporting.
//!
//! When two artifacts with the same conflict key but different versions are
//! reached, the first one discovered in breadth-first order is kept. Every
//! such decision is recorded here.

use std::fmt;

use kreactor_core::artifact::Artifact;

/// A report of all version conflicts encountered during resolution.
#[derive(Debug, Default, Clone)]
pub struct ConflictReport {
    pub conflicts: Vec<VersionConflict>,
}

/// A single conflict: `loser` was requested but `winner` already held the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConflict {
    /// FullId of the module being resolved.
    pub module: String,
    pub winner: Artifact,
    pub loser: Artifact,
    /// FullIds from the module down to the losing artifact.
    pub path: Vec<String>,
}

impl VersionConflict {
    pub fn conflict_key(&self) -> String {
        self.winner.conflict_key()
    }
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: VersionConflict) {
        self.conflicts.push(conflict);
    }

    pub fn extend(&mut self, other: ConflictReport) {
        self.conflicts.extend(other.conflicts);
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Conflicts recorded while resolving `module`.
    pub fn for_module<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a VersionConflict> {
        self.conflicts.iter().filter(move |c| c.module == module)
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for VersionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} kept {}, omitted {}",
            self.module,
            self.conflict_key(),
            self.winner.version,
            self.loser.version
        )?;
        if !self.path.is_empty() {
            write!(f, " (via {})", self.path.join(" -> "))?;
        }
        Ok(())
    }
}
