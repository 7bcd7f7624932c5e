//! Read-only views over a finished resolution, for output layers.

use std::collections::BTreeSet;

use kreactor_core::artifact::Artifact;
use kreactor_core::module::Module;

use crate::common::CommonDependencies;
use crate::ordering;
use crate::resolver::{ModuleResolution, Resolution};

/// Resolved dependencies of a reactor, optionally with a factored common set.
#[derive(Debug, Clone)]
pub struct DependencySummary {
    modules: Vec<ModuleResolution>,
    common: Vec<Artifact>,
    reactor_ids: BTreeSet<String>,
}

impl DependencySummary {
    pub fn new(modules: Vec<ModuleResolution>, common: Vec<Artifact>) -> Self {
        let reactor_ids = modules.iter().map(|m| m.module.id()).collect();
        Self {
            modules,
            common,
            reactor_ids,
        }
    }

    pub fn from_resolution(resolution: &Resolution) -> Self {
        Self::new(resolution.modules.clone(), Vec::new())
    }

    pub fn from_common(factored: CommonDependencies) -> Self {
        Self::new(factored.modules, factored.common)
    }

    pub fn modules(&self) -> &[ModuleResolution] {
        &self.modules
    }

    /// Dependencies shared by every module; empty unless factored.
    pub fn common(&self) -> &[Artifact] {
        &self.common
    }

    /// Sorted reactor dependencies followed by sorted remote dependencies.
    pub fn dependencies(&self, module_id: &str) -> Vec<&Artifact> {
        self.modules
            .iter()
            .find(|m| m.module.id() == module_id)
            .map(|m| m.dependencies.all().collect())
            .unwrap_or_default()
    }

    /// Every remote dependency of the reactor, common ones included, sorted
    /// and without repeats.
    pub fn all_dependencies(&self) -> Vec<Artifact> {
        let mut seen = BTreeSet::new();
        let mut all: Vec<Artifact> = self
            .common
            .iter()
            .chain(self.modules.iter().flat_map(|m| m.dependencies.remote.iter()))
            .filter(|a| seen.insert(a.to_string()))
            .cloned()
            .collect();
        ordering::sort(&mut all);
        all
    }

    pub fn is_reactor_artifact(&self, artifact: &Artifact) -> bool {
        self.reactor_ids.contains(&artifact.full_id())
    }

    /// Modules with the given packaging, sorted by artifactId.
    pub fn modules_with_packaging(&self, packaging: &str) -> Vec<&Module> {
        let mut found: Vec<&Module> = self
            .modules
            .iter()
            .map(|m| &m.module)
            .filter(|m| m.packaging == packaging)
            .collect();
        found.sort_by(|a, b| a.coordinate.artifact_id.cmp(&b.coordinate.artifact_id));
        found
    }
}

/// `group:artifactId:type[:classifier]:version:scope`
pub fn list_line(artifact: &Artifact) -> String {
    format!("{}:{}", artifact.full_id(), artifact.effective_scope())
}
