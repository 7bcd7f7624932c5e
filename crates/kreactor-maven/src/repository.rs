//! Maven local repository layout (`~/.m2/repository`).

use std::path::{Path, PathBuf};

use kreactor_core::artifact::Artifact;
use kreactor_core::version::{MavenVersion, VersionSpec};
use kreactor_util::errors::KreactorResult;

use crate::pom::{self, Pom};

/// How deep a parent chain may go before it is treated as broken.
const MAX_PARENT_DEPTH: usize = 16;

/// A local Maven repository directory.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this repository.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every installed version of `group:artifact`.
    pub fn versions_dir(&self, group: &str, artifact: &str) -> PathBuf {
        self.root.join(group.replace('.', "/")).join(artifact)
    }

    /// Directory of one installed version.
    pub fn artifact_dir(&self, group: &str, artifact: &str, version: &str) -> PathBuf {
        self.versions_dir(group, artifact).join(version)
    }

    pub fn pom_path(&self, group: &str, artifact: &str, version: &str) -> PathBuf {
        self.artifact_dir(group, artifact, version)
            .join(format!("{artifact}-{version}.pom"))
    }

    /// File of `artifact` in the standard layout:
    /// `group/as/dirs/artifactId/version/artifactId-version[-classifier].ext`.
    pub fn path_of(&self, artifact: &Artifact) -> PathBuf {
        let classifier = artifact
            .classifier
            .as_deref()
            .or((artifact.type_ == "test-jar").then_some("tests"));
        self.file_in(artifact, classifier, extension_for(&artifact.type_))
    }

    /// Sibling `-sources.jar` of an artifact.
    pub fn sources_path(&self, artifact: &Artifact) -> PathBuf {
        self.file_in(artifact, Some("sources"), "jar")
    }

    /// Sibling `-javadoc.jar` of an artifact.
    pub fn javadoc_path(&self, artifact: &Artifact) -> PathBuf {
        self.file_in(artifact, Some("javadoc"), "jar")
    }

    fn file_in(&self, artifact: &Artifact, classifier: Option<&str>, ext: &str) -> PathBuf {
        let (a, v) = (&artifact.artifact_id, &artifact.version);
        let filename = match classifier {
            Some(c) => format!("{a}-{v}-{c}.{ext}"),
            None => format!("{a}-{v}.{ext}"),
        };
        self.artifact_dir(&artifact.group, a, v).join(filename)
    }

    pub fn has_pom(&self, group: &str, artifact: &str, version: &str) -> bool {
        self.pom_path(group, artifact, version).is_file()
    }

    /// Parse an installed POM, or `None` when it is not installed.
    pub fn read_pom(&self, group: &str, artifact: &str, version: &str) -> KreactorResult<Option<Pom>> {
        let path = self.pom_path(group, artifact, version);
        if !path.is_file() {
            return Ok(None);
        }
        pom::read_pom(&path).map(Some)
    }

    /// Installed POM with its parent chain applied and properties
    /// interpolated. Missing parents are skipped with a warning.
    pub fn effective_pom(&self, group: &str, artifact: &str, version: &str) -> KreactorResult<Option<Pom>> {
        let Some(mut pom) = self.read_pom(group, artifact, version)? else {
            return Ok(None);
        };

        let mut chain = Vec::new();
        let mut next = pom.parent.clone();
        while let Some(parent_ref) = next.take() {
            if chain.len() >= MAX_PARENT_DEPTH {
                tracing::warn!(%group, %artifact, %version, "parent chain too deep, stopping");
                break;
            }
            match self.read_pom(&parent_ref.group_id, &parent_ref.artifact_id, &parent_ref.version)? {
                Some(parent) => {
                    next = parent.parent.clone();
                    chain.push(parent);
                }
                None => tracing::warn!(
                    parent = %format!("{}:{}:{}", parent_ref.group_id, parent_ref.artifact_id, parent_ref.version),
                    "parent POM not installed"
                ),
            }
        }

        // Nearest parent first: each level only fills what is still missing.
        for parent in &chain {
            pom.apply_parent(parent);
        }
        pom.resolve_properties();
        Ok(Some(pom))
    }

    /// Versions of `group:artifact` that have a POM installed, ascending.
    pub fn installed_versions(&self, group: &str, artifact: &str) -> Vec<MavenVersion> {
        let dir = self.versions_dir(group, artifact);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut versions: Vec<MavenVersion> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|v| self.has_pom(group, artifact, v))
            .map(|v| MavenVersion::parse(&v))
            .collect();
        versions.sort();
        versions
    }

    /// Concrete version for a declared version. A plain version is taken as
    /// is; a range picks the highest installed version inside it.
    pub fn select_version(&self, group: &str, artifact: &str, declared: &str) -> Option<String> {
        match VersionSpec::parse(declared).ok()? {
            VersionSpec::Soft(v) => Some(v.to_string()),
            spec @ VersionSpec::Ranges(_) => {
                let installed = self.installed_versions(group, artifact);
                spec.select(installed.iter()).map(|v| v.to_string())
            }
        }
    }
}

/// File extension used for a dependency type.
pub fn extension_for(type_: &str) -> &str {
    match type_ {
        "test-jar" | "ejb" | "ejb-client" | "bundle" | "maven-plugin" | "java-source" | "javadoc" => {
            "jar"
        }
        other => other,
    }
}
