//! Explicit initialization: configuration, reactor and resolver, loaded once.

use std::path::{Path, PathBuf};

use kreactor_core::config::{FailurePolicy, GlobalConfig};
use kreactor_core::reactor::Reactor;
use kreactor_core::service::{ArtifactResolutionService, IdentityService};
use kreactor_maven::reactor::load_reactor;
use kreactor_maven::repository::LocalRepository;
use kreactor_maven::service::LocalRepositoryService;
use kreactor_resolver::common::factor_common;
use kreactor_resolver::graph::ReactorGraph;
use kreactor_resolver::summary::DependencySummary;
use kreactor_resolver::trace::TracingSink;
use kreactor_resolver::{Resolution, Resolver};
use kreactor_util::errors::KreactorError;

/// Command-line settings that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Config file to read instead of `~/.kreactor/config.toml`.
    pub config_path: Option<PathBuf>,
    /// Keep going when the resolution service fails for a module.
    pub degrade: bool,
    /// Factor dependencies shared by every module.
    pub common: bool,
    /// Local repository directory.
    pub local_repo: Option<PathBuf>,
    /// Skip external expansion; remote dependencies are reported as declared.
    pub reactor_only: bool,
}

/// Everything an operation needs, built once and passed by reference.
pub struct Session {
    pub config: GlobalConfig,
    pub reactor: Reactor,
    pub repository: LocalRepository,
    resolver: Resolver<Box<dyn ArtifactResolutionService>>,
}

impl Session {
    /// Open the reactor whose root `pom.xml` is at or above `project`.
    pub fn open(project: &Path, overrides: &Overrides) -> miette::Result<Self> {
        let root = project_root(project)?;

        let mut config = match &overrides.config_path {
            Some(path) => GlobalConfig::load_from(path)?,
            None => GlobalConfig::load()?,
        };
        if overrides.degrade {
            config.resolution.failure_policy = FailurePolicy::Degrade;
        }
        if overrides.common {
            config.resolution.factor_common = true;
        }
        if let Some(local) = &overrides.local_repo {
            config.repository.local = local.display().to_string();
        }

        let repository = LocalRepository::new(config.repository.local_path());
        let reactor = load_reactor(&root, Some(&repository))?;
        tracing::info!(
            root = %reactor.root_dir.display(),
            modules = reactor.modules.len(),
            repository = %repository.root().display(),
            "loaded reactor"
        );

        let service: Box<dyn ArtifactResolutionService> = if overrides.reactor_only {
            Box::new(IdentityService)
        } else {
            Box::new(LocalRepositoryService::new(repository.clone()))
        };
        let resolver = Resolver::new(service, config.resolution.clone());

        Ok(Self {
            config,
            reactor,
            repository,
            resolver,
        })
    }

    /// Resolve every module of the reactor.
    pub fn resolve(&self) -> miette::Result<Resolution> {
        Ok(self.resolver.resolve(&self.reactor.modules, &mut TracingSink)?)
    }

    /// The validated module graph, without external resolution.
    pub fn graph(&self) -> miette::Result<ReactorGraph> {
        Ok(self
            .resolver
            .reactor_graph(&self.reactor.modules, &mut TracingSink)?)
    }

    /// Summary of a resolution, factored when `factor-common` is on.
    pub fn summarize(&self, resolution: &Resolution) -> DependencySummary {
        if self.config.resolution.factor_common {
            DependencySummary::from_common(factor_common(&resolution.modules))
        } else {
            DependencySummary::from_resolution(resolution)
        }
    }
}

fn project_root(project: &Path) -> miette::Result<PathBuf> {
    if project.is_file() {
        return Ok(project.to_path_buf());
    }
    kreactor_util::fs::find_ancestor_with(project, "pom.xml").ok_or_else(|| {
        KreactorError::Descriptor {
            path: project.display().to_string(),
            message: "no pom.xml found in this directory or any parent".to_string(),
        }
        .into()
    })
}
