//! Loading a reactor from a root `pom.xml` and its `<modules>`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use kreactor_core::module::Module;
use kreactor_core::reactor::Reactor;
use kreactor_util::errors::{KreactorError, KreactorResult};

use crate::pom::{self, ParentRef, Pom};
use crate::repository::LocalRepository;

const POM_FILE: &str = "pom.xml";

/// A POM read from disk, before inheritance.
struct RawPom {
    path: PathBuf,
    pom: Pom,
}

/// Load every module reachable from the descriptor at `root`.
///
/// `root` may be a project directory or a `pom.xml`. Modules are returned in
/// depth-first declaration order, the root first. Parents are looked up
/// among the loaded POMs, then by `relativePath`, then in `local` when given.
pub fn load_reactor(root: &Path, local: Option<&LocalRepository>) -> KreactorResult<Reactor> {
    let root_pom = if root.is_dir() {
        root.join(POM_FILE)
    } else {
        root.to_path_buf()
    };
    if !root_pom.is_file() {
        return Err(KreactorError::Descriptor {
            path: root_pom.display().to_string(),
            message: "no pom.xml found".to_string(),
        });
    }
    let root_dir = base_dir(&root_pom);

    let mut raw = Vec::new();
    let mut visited = HashSet::new();
    collect(&root_pom, &mut raw, &mut visited)?;

    let mut modules = Vec::with_capacity(raw.len());
    for entry in &raw {
        let effective = effective_pom(entry, &raw, local)?;
        modules.push(to_module(&entry.path, &effective)?);
    }
    tracing::info!(root = %root_dir.display(), modules = modules.len(), "loaded reactor");
    Ok(Reactor { root_dir, modules })
}

fn base_dir(pom_path: &Path) -> PathBuf {
    pom_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn collect(
    pom_path: &Path,
    raw: &mut Vec<RawPom>,
    visited: &mut HashSet<PathBuf>,
) -> KreactorResult<()> {
    let canonical = pom_path
        .canonicalize()
        .unwrap_or_else(|_| pom_path.to_path_buf());
    if !visited.insert(canonical) {
        return Ok(());
    }
    let pom = pom::read_pom(pom_path)?;
    let dir = base_dir(pom_path);
    let module_paths: Vec<PathBuf> = pom
        .modules
        .iter()
        .map(|m| {
            let p = dir.join(m.trim());
            if p.is_dir() {
                p.join(POM_FILE)
            } else {
                p
            }
        })
        .collect();
    raw.push(RawPom {
        path: pom_path.to_path_buf(),
        pom,
    });

    for module_pom in module_paths {
        if !module_pom.is_file() {
            return Err(KreactorError::Descriptor {
                path: pom_path.display().to_string(),
                message: format!("module {} has no pom.xml", module_pom.display()),
            });
        }
        collect(&module_pom, raw, visited)?;
    }
    Ok(())
}

fn matches_parent(pom: &Pom, parent: &ParentRef) -> bool {
    pom.artifact_id.as_deref() == Some(parent.artifact_id.as_str())
        && pom.effective_group_id() == Some(parent.group_id.as_str())
        && pom.effective_version() == Some(parent.version.as_str())
}

/// Find the raw parent of `entry`: a loaded POM, the file at `relativePath`
/// (default `../pom.xml`), or the local repository.
fn find_parent(
    entry_path: &Path,
    parent: &ParentRef,
    raw: &[RawPom],
    local: Option<&LocalRepository>,
) -> KreactorResult<Option<(PathBuf, Pom)>> {
    if let Some(found) = raw.iter().find(|r| matches_parent(&r.pom, parent)) {
        return Ok(Some((found.path.clone(), found.pom.clone())));
    }

    let relative = parent.relative_path.as_deref().unwrap_or("../pom.xml");
    if !relative.trim().is_empty() {
        let mut candidate = base_dir(entry_path).join(relative.trim());
        if candidate.is_dir() {
            candidate = candidate.join(POM_FILE);
        }
        if candidate.is_file() {
            let pom = pom::read_pom(&candidate)?;
            if matches_parent(&pom, parent) {
                return Ok(Some((candidate, pom)));
            }
        }
    }

    if let Some(repo) = local {
        if let Some(pom) = repo.effective_pom(&parent.group_id, &parent.artifact_id, &parent.version)? {
            let path = repo.pom_path(&parent.group_id, &parent.artifact_id, &parent.version);
            return Ok(Some((path, pom)));
        }
    }
    Ok(None)
}

fn effective_pom(
    entry: &RawPom,
    raw: &[RawPom],
    local: Option<&LocalRepository>,
) -> KreactorResult<Pom> {
    let mut pom = entry.pom.clone();
    let mut current_path = entry.path.clone();
    let mut next = pom.parent.clone();
    let mut seen = HashSet::new();

    while let Some(parent_ref) = next.take() {
        let key = format!(
            "{}:{}:{}",
            parent_ref.group_id, parent_ref.artifact_id, parent_ref.version
        );
        if !seen.insert(key.clone()) {
            return Err(KreactorError::Descriptor {
                path: entry.path.display().to_string(),
                message: format!("parent cycle through {key}"),
            });
        }
        match find_parent(&current_path, &parent_ref, raw, local)? {
            Some((path, parent)) => {
                pom.apply_parent(&parent);
                next = parent.parent.clone();
                current_path = path;
            }
            None => tracing::warn!(parent = %key, pom = %entry.path.display(), "parent POM not found"),
        }
    }

    let dir = base_dir(&entry.path).display().to_string();
    pom.properties
        .entry("project.basedir".to_string())
        .or_insert_with(|| dir.clone());
    pom.properties.entry("basedir".to_string()).or_insert(dir);
    pom.resolve_properties();
    Ok(pom)
}

fn to_module(path: &Path, pom: &Pom) -> KreactorResult<Module> {
    let missing = |field: &str| KreactorError::Descriptor {
        path: path.display().to_string(),
        message: format!("missing {field}"),
    };
    let group = pom.effective_group_id().ok_or_else(|| missing("groupId"))?;
    let artifact_id = pom.artifact_id.as_deref().ok_or_else(|| missing("artifactId"))?;
    let version = pom.effective_version().ok_or_else(|| missing("version"))?;

    let mut module = Module::new(
        &pom.interpolate(group),
        &pom.interpolate(artifact_id),
        &pom.interpolate(version),
        pom.effective_packaging(),
    );
    module.name = pom.name.clone();
    module.base_dir = Some(base_dir(path));
    module.managed_versions = pom.managed_versions();
    module.repositories = pom.remote_repositories();
    for dep in &pom.dependencies {
        let decl = dep.to_declaration().map_err(|e| KreactorError::Descriptor {
            path: path.display().to_string(),
            message: format!("{}:{}: {e}", dep.group_id, dep.artifact_id),
        })?;
        module.dependencies.push(decl);
    }
    Ok(module)
}
