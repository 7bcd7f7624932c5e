use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::declaration::DependencyDeclaration;

/// One buildable unit of the reactor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// The module's own coordinate. Never carries a scope.
    pub coordinate: Artifact,
    #[serde(default)]
    pub name: Option<String>,
    pub packaging: String,
    /// Direct dependencies in declaration order.
    #[serde(default)]
    pub dependencies: Vec<DependencyDeclaration>,
    /// Managed versions keyed by conflict key (`group:artifact:type[:classifier]`).
    #[serde(default)]
    pub managed_versions: BTreeMap<String, String>,
    #[serde(default)]
    pub repositories: Vec<RemoteRepository>,
    /// Directory holding the module's descriptor, when loaded from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
}

/// A remote repository declared by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
}

impl Module {
    /// A module with `packaging` as its coordinate type and no dependencies.
    pub fn new(group: &str, artifact_id: &str, version: &str, packaging: &str) -> Self {
        Self {
            coordinate: Artifact::new(group, artifact_id, version).with_type(packaging),
            name: None,
            packaging: packaging.to_string(),
            dependencies: Vec::new(),
            managed_versions: BTreeMap::new(),
            repositories: Vec::new(),
            base_dir: None,
        }
    }

    /// Shorthand for a `jar` module.
    pub fn jar(group: &str, artifact_id: &str, version: &str) -> Self {
        Self::new(group, artifact_id, version, "jar")
    }

    pub fn with_dependency(mut self, dep: DependencyDeclaration) -> Self {
        self.dependencies.push(dep);
        self
    }

    /// FullId of the module coordinate.
    pub fn id(&self) -> String {
        self.coordinate.full_id()
    }

    /// Display name, falling back to the artifactId.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.coordinate.artifact_id)
    }
}
