//! Transitive resolution of every reactor module.
//!
//! Per module, a breadth-first walk over reactor edges collects the reactor
//! dependencies and the remote frontier. The frontier is then handed to the
//! [`ArtifactResolutionService`] for full external expansion, and the flat
//! answer is sorted back into reactor and remote sets.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::Serialize;

use kreactor_core::artifact::{Artifact, ExclusionFilter, Scope};
use kreactor_core::config::{FailurePolicy, ResolutionConfig};
use kreactor_core::module::Module;
use kreactor_core::service::{ArtifactResolutionService, ResolutionNode, ResolutionRequest};
use kreactor_util::errors::{KreactorError, KreactorResult};

use crate::classify::{classify, ModuleDependencyData, ReactorSet};
use crate::conflict::{ConflictReport, VersionConflict};
use crate::convert::derive;
use crate::graph::ReactorGraph;
use crate::ordering;
use crate::trace::{EdgeKind, FilterReason, TraceEvent, TraceSink};

/// Sorted dependencies of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedDependencySet {
    pub reactor: Vec<Artifact>,
    pub remote: Vec<Artifact>,
}

impl ResolvedDependencySet {
    pub fn is_empty(&self) -> bool {
        self.reactor.is_empty() && self.remote.is_empty()
    }

    /// Reactor dependencies followed by remote dependencies.
    pub fn all(&self) -> impl Iterator<Item = &Artifact> {
        self.reactor.iter().chain(self.remote.iter())
    }

    pub fn contains(&self, full_id: &str) -> bool {
        self.all().any(|a| a.full_id() == full_id)
    }
}

/// Result for one module.
#[derive(Debug, Clone)]
pub struct ModuleResolution {
    pub module: Module,
    pub dependencies: ResolvedDependencySet,
    /// The service failed and the remote frontier was kept unexpanded.
    pub degraded: bool,
}

/// Result of a whole run, modules in reactor order.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub modules: Vec<ModuleResolution>,
    pub conflicts: ConflictReport,
}

impl Resolution {
    /// Look up a module's result by its FullId.
    pub fn get(&self, module_id: &str) -> Option<&ModuleResolution> {
        self.modules.iter().find(|m| m.module.id() == module_id)
    }

    pub fn dependencies_of(&self, module_id: &str) -> Option<&ResolvedDependencySet> {
        self.get(module_id).map(|m| &m.dependencies)
    }
}

/// Resolves reactor modules against an injected resolution service.
pub struct Resolver<S> {
    service: S,
    config: ResolutionConfig,
}

impl<S: ArtifactResolutionService> Resolver<S> {
    pub fn new(service: S, config: ResolutionConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Validate the reactor and build its module graph.
    ///
    /// Fails on duplicate module coordinates, unparsable versions and cycles.
    pub fn reactor_graph(
        &self,
        modules: &[Module],
        sink: &mut dyn TraceSink,
    ) -> KreactorResult<ReactorGraph> {
        let prepared = self.prepare(modules, sink)?;
        Ok(prepared.graph)
    }

    fn prepare(&self, modules: &[Module], sink: &mut dyn TraceSink) -> KreactorResult<Prepared> {
        let reactor = ReactorSet::build(modules)?;
        let mut data = BTreeMap::new();
        for module in modules {
            data.insert(module.id(), classify(module, &reactor, &self.config, sink)?);
        }
        let graph = ReactorGraph::build(modules, &data);
        graph.check_acyclic()?;
        Ok(Prepared {
            reactor,
            data,
            graph,
        })
    }

    /// Resolve every module. Any fatal error aborts the run without a
    /// partial result.
    pub fn resolve(
        &self,
        modules: &[Module],
        sink: &mut dyn TraceSink,
    ) -> KreactorResult<Resolution> {
        let prepared = self.prepare(modules, sink)?;
        tracing::info!(modules = modules.len(), "resolving reactor");

        let mut resolution = Resolution::default();
        for module in modules {
            let span = tracing::debug_span!("module", id = %module.id());
            let _guard = span.enter();

            let mut recorder = Recorder {
                module: module.id(),
                sink: &mut *sink,
                conflicts: &mut resolution.conflicts,
            };
            let (dependencies, degraded) = self.resolve_module(module, &prepared, &mut recorder)?;
            resolution.modules.push(ModuleResolution {
                module: module.clone(),
                dependencies,
                degraded,
            });
        }
        Ok(resolution)
    }

    fn resolve_module(
        &self,
        module: &Module,
        prepared: &Prepared,
        recorder: &mut Recorder<'_>,
    ) -> KreactorResult<(ResolvedDependencySet, bool)> {
        let mut reactor = Slots::default();
        let mut frontier = Slots::default();

        let mut queue = VecDeque::from([Pending {
            artifact: module.coordinate.clone(),
            path: vec![module.id()],
        }]);
        while let Some(current) = queue.pop_front() {
            let current_id = current.artifact.full_id();
            let deps = prepared
                .data
                .get(&current_id)
                .ok_or(KreactorError::ModuleNotFound {
                    coordinate: current_id,
                })?;
            let inherited = current.artifact.scope;
            let filter = &current.artifact.exclusions;

            for dep in deps.remote() {
                if let Some(next) = recorder.step(dep, inherited, filter) {
                    recorder.admit(&mut frontier, EdgeKind::Remote, next, &current.path);
                }
            }
            for dep in deps.reactor() {
                let Some(next) = recorder.step(dep, inherited, filter) else {
                    continue;
                };
                let expand = next.effective_scope().is_transitive();
                if recorder.admit(&mut reactor, EdgeKind::Reactor, next.clone(), &current.path)
                    && expand
                {
                    let mut path = current.path.clone();
                    path.push(next.full_id());
                    queue.push_back(Pending {
                        artifact: next,
                        path,
                    });
                }
            }
        }

        // System artifacts are already resolved and test/provided ones are
        // never expanded; only compile/runtime go to the service.
        let (expandable, kept): (Vec<Artifact>, Vec<Artifact>) =
            frontier.items.into_iter().partition(|a| {
                a.system_path.is_none() && a.effective_scope().is_transitive()
            });

        let mut remote = Slots::default();
        for artifact in kept {
            remote.admit(artifact);
        }

        let mut degraded = false;
        if !expandable.is_empty() {
            let request = ResolutionRequest {
                roots: &expandable,
                context: &module.coordinate,
                managed_versions: &module.managed_versions,
                repositories: &module.repositories,
            };
            match self.service.resolve_transitively(&request) {
                Ok(nodes) => {
                    tracing::debug!(roots = expandable.len(), nodes = nodes.len(), "service resolved frontier");
                    for node in nodes {
                        recorder.accept(node, &expandable, &prepared.reactor, &mut reactor, &mut remote);
                    }
                }
                Err(e) if self.config.failure_policy == FailurePolicy::Degrade => {
                    recorder.sink.record(TraceEvent::ResolutionDegraded {
                        module: module.id(),
                        message: e.to_string(),
                    });
                    degraded = true;
                    for artifact in expandable {
                        remote.admit(artifact);
                    }
                }
                Err(e) => return Err(into_resolution_error(&module.id(), &expandable, e)),
            }
        }

        let mut dependencies = ResolvedDependencySet {
            reactor: reactor.items,
            remote: remote.items,
        };
        ordering::sort(&mut dependencies.reactor);
        ordering::sort(&mut dependencies.remote);
        Ok((dependencies, degraded))
    }
}

/// Wrap a service failure, naming the frontier it was asked to expand.
fn into_resolution_error(
    module: &str,
    frontier: &[Artifact],
    err: KreactorError,
) -> KreactorError {
    match err {
        e @ KreactorError::Resolution { .. } => e,
        other => {
            let roots: Vec<String> = frontier.iter().map(Artifact::full_id).collect();
            KreactorError::Resolution {
                module: module.to_string(),
                message: format!("{other} (resolving {})", roots.join(", ")),
            }
        }
    }
}

struct Prepared {
    reactor: ReactorSet,
    data: BTreeMap<String, ModuleDependencyData>,
    graph: ReactorGraph,
}

/// A reactor dependency waiting to be expanded.
struct Pending {
    /// Carries the inherited scope and the exclusions accumulated so far.
    artifact: Artifact,
    /// FullIds from the resolved module down to `artifact`.
    path: Vec<String>,
}

enum Admission {
    New,
    Duplicate,
    Conflict(Artifact),
}

/// Insertion-ordered map from conflict key to the first artifact seen.
#[derive(Default)]
struct Slots {
    by_key: HashMap<String, usize>,
    items: Vec<Artifact>,
}

impl Slots {
    fn admit(&mut self, artifact: Artifact) -> Admission {
        let key = artifact.conflict_key();
        match self.by_key.get(&key) {
            Some(&i) if self.items[i].version == artifact.version => Admission::Duplicate,
            Some(&i) => Admission::Conflict(self.items[i].clone()),
            None => {
                self.by_key.insert(key, self.items.len());
                self.items.push(artifact);
                Admission::New
            }
        }
    }
}

/// Emits trace events and conflicts for the module being resolved.
struct Recorder<'a> {
    module: String,
    sink: &'a mut dyn TraceSink,
    conflicts: &'a mut ConflictReport,
}

impl Recorder<'_> {
    fn filtered(&mut self, dependency: &Artifact, reason: FilterReason) {
        self.sink.record(TraceEvent::FilteredDependency {
            module: self.module.clone(),
            dependency: dependency.clone(),
            reason,
        });
    }

    /// Derive the artifact `dep` becomes one hop further along the path, or
    /// `None` when scope, optionality or exclusions drop it.
    fn step(
        &mut self,
        dep: &Artifact,
        inherited: Option<Scope>,
        filter: &ExclusionFilter,
    ) -> Option<Artifact> {
        let Some(mut next) = derive(dep, inherited) else {
            self.filtered(
                dep,
                FilterReason::ScopeNotInherited {
                    inherited: inherited.unwrap_or_default(),
                },
            );
            return None;
        };
        if inherited.is_some() && dep.optional {
            self.filtered(dep, FilterReason::Optional);
            return None;
        }
        if filter.excludes(&dep.group, &dep.artifact_id) {
            self.filtered(dep, FilterReason::Excluded);
            return None;
        }
        next.exclusions = filter.union(&dep.exclusions);
        Some(next)
    }

    /// Insert into `slots`, reporting what happened. Returns `true` for a
    /// newly discovered artifact.
    fn admit(
        &mut self,
        slots: &mut Slots,
        edge: EdgeKind,
        artifact: Artifact,
        parent_path: &[String],
    ) -> bool {
        match slots.admit(artifact.clone()) {
            Admission::New => {
                self.sink.record(TraceEvent::NewDependency {
                    module: self.module.clone(),
                    dependency: artifact,
                    edge,
                });
                true
            }
            Admission::Duplicate => {
                self.sink.record(TraceEvent::DuplicateDependency {
                    module: self.module.clone(),
                    dependency: artifact,
                    edge,
                });
                false
            }
            Admission::Conflict(winner) => {
                let mut path = parent_path.to_vec();
                path.push(artifact.full_id());
                self.conflicts.add(VersionConflict {
                    module: self.module.clone(),
                    winner: winner.clone(),
                    loser: artifact.clone(),
                    path: path.clone(),
                });
                self.sink.record(TraceEvent::ConflictDetected {
                    module: self.module.clone(),
                    winner,
                    loser: artifact,
                    path,
                });
                false
            }
        }
    }

    /// Sort one node of the service's answer into the reactor or remote set.
    fn accept(
        &mut self,
        node: ResolutionNode,
        roots: &[Artifact],
        reactor_set: &ReactorSet,
        reactor: &mut Slots,
        remote: &mut Slots,
    ) {
        let root = roots.get(node.root);
        if node.depth() > 0 {
            if let Some(root) = root {
                if root
                    .exclusions
                    .excludes(&node.artifact.group, &node.artifact.artifact_id)
                {
                    self.filtered(&node.artifact, FilterReason::Excluded);
                    return;
                }
            }
        }

        if node.artifact.full_id() == self.module {
            tracing::debug!(module = %self.module, "dropping self-reference from service answer");
            return;
        }

        let mut artifact = node.artifact;
        if artifact.scope.is_none() {
            artifact.scope = root.and_then(|r| r.scope);
        }
        let mut parent_path = vec![self.module.clone()];
        parent_path.extend(node.trail.iter().take(node.trail.len().saturating_sub(1)).cloned());

        if reactor_set.contains(&artifact) {
            self.admit(reactor, EdgeKind::Reactor, artifact, &parent_path);
        } else {
            self.admit(remote, EdgeKind::Remote, artifact, &parent_path);
        }
    }
}
