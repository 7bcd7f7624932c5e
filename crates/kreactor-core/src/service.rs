//! Contract of the external artifact resolution service.
//!
//! The engine hands each module's direct remote frontier to a service that
//! expands it transitively (version ranges, repository metadata, nearest-wins
//! semantics). The engine itself never touches a repository.

use std::collections::BTreeMap;

use kreactor_util::errors::KreactorResult;

use crate::artifact::Artifact;
use crate::module::RemoteRepository;

/// Everything the service needs to expand one module's frontier.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionRequest<'a> {
    /// Frontier artifacts, in discovery order.
    pub roots: &'a [Artifact],
    /// Coordinate of the module being resolved.
    pub context: &'a Artifact,
    /// Managed versions keyed by conflict key.
    pub managed_versions: &'a BTreeMap<String, String>,
    pub repositories: &'a [RemoteRepository],
}

/// One artifact of the resolved flat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionNode {
    pub artifact: Artifact,
    /// Index into [`ResolutionRequest::roots`] of the frontier artifact this
    /// node was reached from.
    pub root: usize,
    /// FullIds from the frontier artifact down to this node, inclusive.
    pub trail: Vec<String>,
}

impl ResolutionNode {
    /// A node for the frontier artifact itself.
    pub fn root(artifact: Artifact, root: usize) -> Self {
        let trail = vec![artifact.full_id()];
        Self {
            artifact,
            root,
            trail,
        }
    }

    /// A node reached from `parent`.
    pub fn child_of(parent: &ResolutionNode, artifact: Artifact) -> Self {
        let mut trail = parent.trail.clone();
        trail.push(artifact.full_id());
        Self {
            artifact,
            root: parent.root,
            trail,
        }
    }

    /// Number of edges between the frontier artifact and this node.
    pub fn depth(&self) -> usize {
        self.trail.len().saturating_sub(1)
    }
}

/// Expands a frontier of external artifacts into their transitive closure.
///
/// Implementations return every node of the closure, frontier artifacts
/// included, one per conflict key, in breadth-first order. Calls may block on
/// I/O; there is no timeout or retry at this boundary.
pub trait ArtifactResolutionService {
    fn resolve_transitively(
        &self,
        request: &ResolutionRequest<'_>,
    ) -> KreactorResult<Vec<ResolutionNode>>;
}

impl<T: ArtifactResolutionService + ?Sized> ArtifactResolutionService for &T {
    fn resolve_transitively(
        &self,
        request: &ResolutionRequest<'_>,
    ) -> KreactorResult<Vec<ResolutionNode>> {
        (**self).resolve_transitively(request)
    }
}

impl<T: ArtifactResolutionService + ?Sized> ArtifactResolutionService for Box<T> {
    fn resolve_transitively(
        &self,
        request: &ResolutionRequest<'_>,
    ) -> KreactorResult<Vec<ResolutionNode>> {
        (**self).resolve_transitively(request)
    }
}

/// A service that performs no expansion: every frontier artifact resolves to
/// itself. Useful when only reactor-internal structure matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityService;

impl ArtifactResolutionService for IdentityService {
    fn resolve_transitively(
        &self,
        request: &ResolutionRequest<'_>,
    ) -> KreactorResult<Vec<ResolutionNode>> {
        Ok(request
            .roots
            .iter()
            .enumerate()
            .map(|(i, a)| ResolutionNode::root(a.clone(), i))
            .collect())
    }
}
