//! Reactor dependency resolution engine.
//!
//! Given the modules of a multi-module project, computes for every module
//! the transitive set of reactor (intra-project) and remote (external)
//! dependencies. Remote subtrees are expanded by an injected
//! [`ArtifactResolutionService`](kreactor_core::service::ArtifactResolutionService);
//! this crate performs no I/O.

pub mod classify;
pub mod common;
pub mod conflict;
pub mod convert;
pub mod graph;
pub mod ordering;
pub mod resolver;
pub mod summary;
pub mod trace;

pub use resolver::{ModuleResolution, Resolution, ResolvedDependencySet, Resolver};
