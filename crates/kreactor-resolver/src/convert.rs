//! Conversion of descriptor declarations into artifacts.

use std::path::PathBuf;

use kreactor_core::artifact::{Artifact, ExclusionFilter, Scope};
use kreactor_core::declaration::DependencyDeclaration;
use kreactor_core::module::Module;
use kreactor_core::version::VersionSpec;
use kreactor_util::errors::{KreactorError, KreactorResult};

/// Turn a declaration of `module` into an [`Artifact`].
///
/// A missing version is filled from the module's managed versions. The
/// version must parse as a plain version or a range; ranges are kept verbatim
/// for the resolution service to pick from. Scope defaults to compile.
pub fn to_artifact(module: &Module, decl: &DependencyDeclaration) -> KreactorResult<Artifact> {
    let mut artifact = Artifact::new(&decl.group, &decl.artifact, &decl.version)
        .with_type(&decl.type_)
        .with_optional(decl.optional);
    if let Some(classifier) = decl.classifier.as_deref() {
        artifact = artifact.with_classifier(classifier);
    }

    if decl.version.trim().is_empty() {
        if let Some(managed) = module.managed_versions.get(&artifact.conflict_key()) {
            artifact.version = managed.clone();
        }
    }
    VersionSpec::parse(&artifact.version).map_err(|e| KreactorError::InvalidVersionSpec {
        module: module.id(),
        artifact: decl.key(),
        spec: decl.version.clone(),
        reason: e.to_string(),
    })?;
    artifact.version = artifact.version.trim().to_string();

    let scope = decl.scope.unwrap_or_default();
    artifact.scope = Some(scope);
    artifact.exclusions =
        ExclusionFilter::from_patterns(decl.exclusions.iter().map(|e| e.pattern()));

    if scope == Scope::System {
        let Some(path) = decl.system_path.as_deref().filter(|p| !p.trim().is_empty()) else {
            return Err(KreactorError::MissingSystemPath {
                module: module.id(),
                artifact: artifact.full_id(),
            });
        };
        artifact.system_path = Some(PathBuf::from(path));
    }
    Ok(artifact)
}

/// The artifact `dep` becomes when reached through a path whose ambient scope
/// is `inherited`, or `None` when scope inheritance drops it.
pub fn derive(dep: &Artifact, inherited: Option<Scope>) -> Option<Artifact> {
    let scope = Scope::inherit(dep.effective_scope(), inherited)?;
    let mut derived = dep.clone();
    derived.scope = Some(scope);
    Some(derived)
}
