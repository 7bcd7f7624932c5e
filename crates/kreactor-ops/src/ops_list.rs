//! Operation: list the resolved dependencies of every module.

use serde::Serialize;

use kreactor_core::artifact::Artifact;
use kreactor_maven::repository::LocalRepository;
use kreactor_resolver::summary::{list_line, DependencySummary};

use crate::{OutputFormat, Session};

/// Options for `kreactor list`.
#[derive(Debug, Default)]
pub struct ListOptions {
    pub format: OutputFormat,
    /// Include local repository paths of each remote artifact.
    pub paths: bool,
    /// Only list this module (FullId or artifactId).
    pub module: Option<String>,
}

#[derive(Debug, Serialize)]
struct ModuleListing {
    module: String,
    name: String,
    packaging: String,
    degraded: bool,
    dependencies: Vec<ListedDependency>,
}

#[derive(Debug, Serialize)]
struct ListedDependency {
    #[serde(rename = "groupId")]
    group: String,
    #[serde(rename = "artifactId")]
    artifact_id: String,
    #[serde(rename = "type")]
    type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    classifier: Option<String>,
    version: String,
    scope: String,
    reactor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<ArtifactPaths>,
}

#[derive(Debug, Serialize)]
struct ArtifactPaths {
    file: String,
    sources: String,
    javadoc: String,
}

#[derive(Debug, Serialize)]
struct Listing {
    common: Vec<ListedDependency>,
    modules: Vec<ModuleListing>,
}

/// Resolve the reactor and print its dependency listing.
pub fn list(session: &Session, opts: &ListOptions) -> miette::Result<()> {
    let resolution = session.resolve()?;
    let summary = session.summarize(&resolution);
    print!("{}", render(&summary, &session.repository, opts)?);
    Ok(())
}

/// Render a listing in the requested format.
pub fn render(
    summary: &DependencySummary,
    repository: &LocalRepository,
    opts: &ListOptions,
) -> miette::Result<String> {
    let listing = build_listing(summary, repository, opts)?;
    match opts.format {
        OutputFormat::Json => Ok(format!("{}\n", crate::to_json(&listing)?)),
        OutputFormat::Text => Ok(render_text(summary, repository, opts, &listing)),
    }
}

fn build_listing(
    summary: &DependencySummary,
    repository: &LocalRepository,
    opts: &ListOptions,
) -> miette::Result<Listing> {
    let to_listed = |a: &Artifact| listed(summary, repository, opts.paths, a);

    let mut modules = Vec::new();
    for resolution in summary.modules() {
        let module = &resolution.module;
        if let Some(wanted) = &opts.module {
            if &module.id() != wanted && &module.coordinate.artifact_id != wanted {
                continue;
            }
        }
        modules.push(ModuleListing {
            module: module.id(),
            name: module.display_name().to_string(),
            packaging: module.packaging.clone(),
            degraded: resolution.degraded,
            dependencies: summary
                .dependencies(&module.id())
                .into_iter()
                .map(&to_listed)
                .collect(),
        });
    }
    if let Some(wanted) = &opts.module {
        if modules.is_empty() {
            return Err(kreactor_util::errors::KreactorError::ModuleNotFound {
                coordinate: wanted.clone(),
            }
            .into());
        }
    }

    Ok(Listing {
        common: summary.common().iter().map(&to_listed).collect(),
        modules,
    })
}

fn listed(
    summary: &DependencySummary,
    repository: &LocalRepository,
    with_paths: bool,
    artifact: &Artifact,
) -> ListedDependency {
    let reactor = summary.is_reactor_artifact(artifact);
    let paths = (with_paths && !reactor).then(|| ArtifactPaths {
        file: match &artifact.system_path {
            Some(path) => path.display().to_string(),
            None => repository.path_of(artifact).display().to_string(),
        },
        sources: repository.sources_path(artifact).display().to_string(),
        javadoc: repository.javadoc_path(artifact).display().to_string(),
    });
    ListedDependency {
        group: artifact.group.clone(),
        artifact_id: artifact.artifact_id.clone(),
        type_: artifact.type_.clone(),
        classifier: artifact.classifier.clone(),
        version: artifact.version.clone(),
        scope: artifact.effective_scope().to_string(),
        reactor,
        paths,
    }
}

fn render_text(
    summary: &DependencySummary,
    repository: &LocalRepository,
    opts: &ListOptions,
    listing: &Listing,
) -> String {
    let mut out = String::new();
    let rule = "-".repeat(72);

    if !summary.common().is_empty() && opts.module.is_none() {
        out.push_str(&format!("{rule}\nCommon dependencies\n{rule}\n"));
        for artifact in summary.common() {
            push_line(&mut out, summary, repository, opts.paths, artifact);
        }
        out.push('\n');
    }

    for module in &listing.modules {
        out.push_str(&format!("{rule}\nListing {} {}\n{rule}\n", module.name, module.module));
        if module.degraded {
            out.push_str("warning: resolution degraded, remote dependencies not expanded\n");
        }
        out.push_str("The following files have been resolved:\n");
        for artifact in summary.dependencies(&module.module) {
            push_line(&mut out, summary, repository, opts.paths, artifact);
        }
        out.push('\n');
    }
    out
}

fn push_line(
    out: &mut String,
    summary: &DependencySummary,
    repository: &LocalRepository,
    with_paths: bool,
    artifact: &Artifact,
) {
    out.push_str(&format!("   {}", list_line(artifact)));
    if with_paths && !summary.is_reactor_artifact(artifact) {
        let path = match &artifact.system_path {
            Some(path) => path.clone(),
            None => repository.path_of(artifact),
        };
        out.push_str(&format!(" -> {}", path.display()));
    }
    out.push('\n');
}
