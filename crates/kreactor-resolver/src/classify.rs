//! Splitting each module's direct dependencies into reactor and remote edges.

use std::collections::BTreeSet;

use kreactor_core::artifact::Artifact;
use kreactor_core::config::ResolutionConfig;
use kreactor_core::module::Module;
use kreactor_util::errors::{KreactorError, KreactorResult};

use crate::convert::to_artifact;
use crate::trace::{FilterReason, TraceEvent, TraceSink};

/// FullIds of every module coordinate in the reactor.
#[derive(Debug, Clone, Default)]
pub struct ReactorSet {
    ids: BTreeSet<String>,
}

impl ReactorSet {
    /// Collect module coordinates, rejecting two modules with the same
    /// `group:artifactId:version` whatever their packaging.
    pub fn build(modules: &[Module]) -> KreactorResult<Self> {
        let mut gavs = BTreeSet::new();
        let mut ids = BTreeSet::new();
        for module in modules {
            let c = &module.coordinate;
            let gav = format!("{}:{}:{}", c.group, c.artifact_id, c.version);
            if !gavs.insert(gav.clone()) {
                return Err(KreactorError::DuplicateArtifactId { coordinate: gav });
            }
            ids.insert(module.id());
        }
        Ok(Self { ids })
    }

    /// Whether `artifact` names a module of this reactor.
    pub fn contains(&self, artifact: &Artifact) -> bool {
        self.ids.contains(&artifact.full_id())
    }

    pub fn contains_id(&self, full_id: &str) -> bool {
        self.ids.contains(full_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A direct dependency, tagged with where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyEdge {
    /// Built by the reactor itself.
    Reactor(Artifact),
    /// Fetched from a repository.
    Remote(Artifact),
}

impl DependencyEdge {
    pub fn artifact(&self) -> &Artifact {
        match self {
            DependencyEdge::Reactor(a) | DependencyEdge::Remote(a) => a,
        }
    }

    pub fn is_reactor(&self) -> bool {
        matches!(self, DependencyEdge::Reactor(_))
    }
}

/// Classified direct dependencies of one module, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ModuleDependencyData {
    pub edges: Vec<DependencyEdge>,
}

impl ModuleDependencyData {
    pub fn reactor(&self) -> impl Iterator<Item = &Artifact> {
        self.edges.iter().filter_map(|e| match e {
            DependencyEdge::Reactor(a) => Some(a),
            DependencyEdge::Remote(_) => None,
        })
    }

    pub fn remote(&self) -> impl Iterator<Item = &Artifact> {
        self.edges.iter().filter_map(|e| match e {
            DependencyEdge::Remote(a) => Some(a),
            DependencyEdge::Reactor(_) => None,
        })
    }
}

/// Convert and classify the direct dependencies of `module`.
///
/// Dependencies whose type is not a configured library type are reported and
/// skipped. A version that cannot be parsed aborts the whole run.
pub fn classify(
    module: &Module,
    reactor: &ReactorSet,
    config: &ResolutionConfig,
    sink: &mut dyn TraceSink,
) -> KreactorResult<ModuleDependencyData> {
    let mut data = ModuleDependencyData::default();
    for decl in &module.dependencies {
        let artifact = to_artifact(module, decl)?;
        if !config.is_library_type(&artifact.type_) {
            sink.record(TraceEvent::FilteredDependency {
                module: module.id(),
                dependency: artifact,
                reason: FilterReason::NonLibraryType,
            });
            continue;
        }
        let edge = if reactor.contains(&artifact) {
            DependencyEdge::Reactor(artifact)
        } else {
            DependencyEdge::Remote(artifact)
        };
        data.edges.push(edge);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::RecordingSink;
    use kreactor_core::declaration::DependencyDeclaration;

    #[test]
    fn duplicate_module_rejected() {
        let modules = vec![
            Module::jar("com.acme", "core", "1.0"),
            Module::jar("com.acme", "core", "1.0"),
        ];
        let err = ReactorSet::build(&modules).unwrap_err();
        assert!(err.to_string().contains("com.acme:core:1.0"));
    }

    #[test]
    fn same_gav_with_other_packaging_rejected() {
        let modules = vec![
            Module::new("com.acme", "core", "1.0", "jar"),
            Module::new("com.acme", "core", "1.0", "war"),
        ];
        match ReactorSet::build(&modules).unwrap_err() {
            KreactorError::DuplicateArtifactId { coordinate } => {
                assert_eq!(coordinate, "com.acme:core:1.0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn splits_reactor_and_remote() {
        let core = Module::jar("com.acme", "core", "1.0");
        let app = Module::jar("com.acme", "app", "1.0")
            .with_dependency(DependencyDeclaration::new("com.acme", "core", "1.0"))
            .with_dependency(DependencyDeclaration::new("org.x", "lib", "2.0"))
            // Same artifactId, different version: not the reactor module.
            .with_dependency(DependencyDeclaration::new("com.acme", "core", "0.9").with_classifier("old"));
        let set = ReactorSet::build(&[core, app.clone()]).unwrap();

        let mut sink = RecordingSink::new();
        let data = classify(&app, &set, &ResolutionConfig::default(), &mut sink).unwrap();
        let reactor: Vec<_> = data.reactor().map(Artifact::full_id).collect();
        let remote: Vec<_> = data.remote().map(Artifact::full_id).collect();
        assert_eq!(reactor, ["com.acme:core:jar:1.0"]);
        assert_eq!(remote, ["org.x:lib:jar:2.0", "com.acme:core:jar:old:0.9"]);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn non_library_types_are_skipped() {
        let app = Module::jar("com.acme", "app", "1.0")
            .with_dependency(DependencyDeclaration::new("org.x", "bom", "1.0").with_type("pom"))
            .with_dependency(DependencyDeclaration::new("org.x", "lib", "1.0"));
        let set = ReactorSet::build(std::slice::from_ref(&app)).unwrap();

        let mut sink = RecordingSink::new();
        let data = classify(&app, &set, &ResolutionConfig::default(), &mut sink).unwrap();
        assert_eq!(data.edges.len(), 1);
        assert_eq!(
            sink.filtered(&FilterReason::NonLibraryType),
            ["org.x:bom:pom:1.0"]
        );
    }
}
