//! Resolution service backed by a local Maven repository.
//!
//! Expands a frontier breadth-first over installed POMs with Maven's
//! nearest-wins rule: the first version of a conflict key reached is the one
//! kept.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use kreactor_core::artifact::{Artifact, ExclusionFilter, Scope};
use kreactor_core::service::{ArtifactResolutionService, ResolutionNode, ResolutionRequest};
use kreactor_util::errors::{KreactorError, KreactorResult};

use crate::pom::Pom;
use crate::repository::LocalRepository;

pub struct LocalRepositoryService {
    repo: LocalRepository,
    poms: RefCell<HashMap<String, Option<Pom>>>,
}

impl LocalRepositoryService {
    pub fn new(repo: LocalRepository) -> Self {
        Self {
            repo,
            poms: RefCell::new(HashMap::new()),
        }
    }

    pub fn repository(&self) -> &LocalRepository {
        &self.repo
    }

    fn pom(&self, artifact: &Artifact) -> KreactorResult<Option<Pom>> {
        let key = format!("{}:{}:{}", artifact.group, artifact.artifact_id, artifact.version);
        if let Some(cached) = self.poms.borrow().get(&key) {
            return Ok(cached.clone());
        }
        let pom = self
            .repo
            .effective_pom(&artifact.group, &artifact.artifact_id, &artifact.version)?;
        self.poms.borrow_mut().insert(key, pom.clone());
        Ok(pom)
    }

    /// Pin a frontier artifact to an installed version.
    fn resolve_root(&self, root: &Artifact, context: &Artifact) -> KreactorResult<Artifact> {
        let not_found = |detail: String| KreactorError::Resolution {
            module: context.full_id(),
            message: format!(
                "{} {detail} in local repository {}",
                root.full_id(),
                self.repo.root().display()
            ),
        };
        let version = self
            .repo
            .select_version(&root.group, &root.artifact_id, &root.version)
            .ok_or_else(|| not_found("has no matching version".to_string()))?;
        if !self.repo.has_pom(&root.group, &root.artifact_id, &version) {
            return Err(not_found("is not installed".to_string()));
        }
        Ok(root.clone().with_version(&version))
    }

    /// Direct dependencies of `node` that travel transitively.
    fn children(
        &self,
        node: &ResolutionNode,
        filter: &ExclusionFilter,
        request: &ResolutionRequest<'_>,
    ) -> KreactorResult<Vec<Artifact>> {
        let Some(pom) = self.pom(&node.artifact)? else {
            tracing::warn!(artifact = %node.artifact.full_id(), "POM not installed, not expanding");
            return Ok(Vec::new());
        };

        let mut children = Vec::new();
        for dep in &pom.dependencies {
            if dep.optional || filter.excludes(&dep.group_id, &dep.artifact_id) {
                continue;
            }
            let own = match dep.parsed_scope() {
                Ok(scope) => scope.unwrap_or_default(),
                Err(e) => {
                    tracing::debug!(artifact = %node.artifact.full_id(), "skipping dependency: {e}");
                    continue;
                }
            };
            if matches!(own, Scope::Test | Scope::Provided | Scope::System) {
                continue;
            }
            let Some(scope) = Scope::inherit(own, node.artifact.scope) else {
                continue;
            };

            let key = dep.conflict_key();
            let declared = request
                .managed_versions
                .get(&key)
                .map(String::as_str)
                .or(dep.version.as_deref())
                .or_else(|| pom.managed_version(&key))
                .unwrap_or("");
            let Some(version) = self
                .repo
                .select_version(&dep.group_id, &dep.artifact_id, declared)
            else {
                tracing::debug!(dependency = %key, declared, "no usable version, skipping");
                continue;
            };

            let mut child = Artifact::new(&dep.group_id, &dep.artifact_id, &version)
                .with_type(dep.type_or_default())
                .with_scope(scope);
            if let Some(classifier) = dep.classifier.as_deref() {
                child = child.with_classifier(classifier);
            }
            child.exclusions = filter.union(&ExclusionFilter::from_patterns(
                dep.exclusions.iter().map(|e| {
                    format!("{}:{}", e.group_id, e.artifact_id.as_deref().unwrap_or("*"))
                }),
            ));
            children.push(child);
        }
        Ok(children)
    }
}

impl ArtifactResolutionService for LocalRepositoryService {
    fn resolve_transitively(
        &self,
        request: &ResolutionRequest<'_>,
    ) -> KreactorResult<Vec<ResolutionNode>> {
        let mut queue = VecDeque::new();
        for (i, root) in request.roots.iter().enumerate() {
            let pinned = self.resolve_root(root, request.context)?;
            queue.push_back(ResolutionNode::root(pinned, i));
        }

        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        while let Some(node) = queue.pop_front() {
            if !seen.insert(node.artifact.conflict_key()) {
                continue;
            }
            let filter = node.artifact.exclusions.clone();
            for child in self.children(&node, &filter, request)? {
                queue.push_back(ResolutionNode::child_of(&node, child));
            }
            resolved.push(node);
        }
        tracing::debug!(
            context = %request.context.full_id(),
            roots = request.roots.len(),
            resolved = resolved.len(),
            "expanded frontier from local repository"
        );
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn install(root: &Path, coord: &str, deps: &str) {
        let parts: Vec<&str> = coord.split(':').collect();
        let (g, a, v) = (parts[0], parts[1], parts[2]);
        let path = LocalRepository::new(root).pom_path(g, a, v);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            path,
            format!(
                "<project><groupId>{g}</groupId><artifactId>{a}</artifactId><version>{v}</version>\
                 <dependencies>{deps}</dependencies></project>"
            ),
        )
        .unwrap();
    }

    fn dep(coord: &str, extra: &str) -> String {
        let parts: Vec<&str> = coord.split(':').collect();
        format!(
            "<dependency><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version>{extra}</dependency>",
            parts[0], parts[1], parts[2]
        )
    }

    fn resolve(
        root: &Path,
        roots: &[Artifact],
        managed: &BTreeMap<String, String>,
    ) -> KreactorResult<Vec<ResolutionNode>> {
        let service = LocalRepositoryService::new(LocalRepository::new(root));
        let context = Artifact::new("com.acme", "app", "1.0");
        service.resolve_transitively(&ResolutionRequest {
            roots,
            context: &context,
            managed_versions: managed,
            repositories: &[],
        })
    }

    fn ids(nodes: &[ResolutionNode]) -> Vec<String> {
        nodes.iter().map(|n| n.artifact.to_string()).collect()
    }

    fn compile(coord: &str) -> Artifact {
        Artifact::parse(coord).unwrap().with_scope(Scope::Compile)
    }

    #[test]
    fn nearest_wins_breadth_first() {
        let tmp = tempfile::tempdir().unwrap();
        install(tmp.path(), "org.a:a:1.0", &dep("org.c:c:1.0", ""));
        install(tmp.path(), "org.b:b:1.0", &dep("org.x:deep:1.0", ""));
        install(tmp.path(), "org.x:deep:1.0", &dep("org.c:c:2.0", ""));
        install(tmp.path(), "org.c:c:1.0", "");
        install(tmp.path(), "org.c:c:2.0", "");

        let nodes = resolve(
            tmp.path(),
            &[compile("org.a:a:1.0"), compile("org.b:b:1.0")],
            &BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(
            ids(&nodes),
            [
                "org.a:a:jar:1.0:compile",
                "org.b:b:jar:1.0:compile",
                "org.c:c:jar:1.0:compile",
                "org.x:deep:jar:1.0:compile",
            ]
        );
        let c = &nodes[2];
        assert_eq!(c.root, 0);
        assert_eq!(c.trail, ["org.a:a:jar:1.0", "org.c:c:jar:1.0"]);
    }

    #[test]
    fn skips_optional_and_non_transitive_scopes() {
        let tmp = tempfile::tempdir().unwrap();
        let deps = [
            dep("org.x:opt:1.0", "<optional>true</optional>"),
            dep("org.x:junit:1.0", "<scope>test</scope>"),
            dep("org.x:servlet:1.0", "<scope>provided</scope>"),
            dep("org.x:rt:1.0", "<scope>runtime</scope>"),
        ]
        .concat();
        install(tmp.path(), "org.a:a:1.0", &deps);
        install(tmp.path(), "org.x:rt:1.0", "");

        let nodes = resolve(tmp.path(), &[compile("org.a:a:1.0")], &BTreeMap::new()).unwrap();
        assert_eq!(
            ids(&nodes),
            ["org.a:a:jar:1.0:compile", "org.x:rt:jar:1.0:runtime"]
        );
    }

    #[test]
    fn exclusions_from_root_and_pom() {
        let tmp = tempfile::tempdir().unwrap();
        install(
            tmp.path(),
            "org.a:a:1.0",
            &[
                dep("org.x:b:1.0", ""),
                dep(
                    "org.x:c:1.0",
                    "<exclusions><exclusion><groupId>org.y</groupId><artifactId>*</artifactId></exclusion></exclusions>",
                ),
            ]
            .concat(),
        );
        install(tmp.path(), "org.x:b:1.0", "");
        install(tmp.path(), "org.x:c:1.0", &dep("org.y:d:1.0", ""));

        let mut root = compile("org.a:a:1.0");
        root.exclusions.insert("org.x:b");
        let nodes = resolve(tmp.path(), &[root], &BTreeMap::new()).unwrap();
        assert_eq!(
            ids(&nodes),
            ["org.a:a:jar:1.0:compile", "org.x:c:jar:1.0:compile"]
        );
    }

    #[test]
    fn managed_versions_override_transitive_versions() {
        let tmp = tempfile::tempdir().unwrap();
        install(tmp.path(), "org.a:a:1.0", &dep("org.x:lib:1.0", ""));
        install(tmp.path(), "org.x:lib:1.0", "");
        install(tmp.path(), "org.x:lib:1.2", "");

        let managed = BTreeMap::from([("org.x:lib:jar".to_string(), "1.2".to_string())]);
        let nodes = resolve(tmp.path(), &[compile("org.a:a:1.0")], &managed).unwrap();
        assert_eq!(nodes[1].artifact.version, "1.2");
    }

    #[test]
    fn root_range_picks_highest_installed() {
        let tmp = tempfile::tempdir().unwrap();
        install(tmp.path(), "org.a:a:1.0", "");
        install(tmp.path(), "org.a:a:1.4", "");
        install(tmp.path(), "org.a:a:2.0", "");

        let root = Artifact::new("org.a", "a", "[1.0,2.0)").with_scope(Scope::Compile);
        let nodes = resolve(tmp.path(), &[root], &BTreeMap::new()).unwrap();
        assert_eq!(ids(&nodes), ["org.a:a:jar:1.4:compile"]);
    }

    #[test]
    fn missing_root_is_a_resolution_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = resolve(tmp.path(), &[compile("org.a:a:1.0")], &BTreeMap::new()).unwrap_err();
        match err {
            KreactorError::Resolution { module, message } => {
                assert_eq!(module, "com.acme:app:jar:1.0");
                assert!(message.contains("org.a:a:jar:1.0 is not installed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_transitive_pom_is_a_leaf() {
        let tmp = tempfile::tempdir().unwrap();
        install(tmp.path(), "org.a:a:1.0", &dep("org.x:gone:1.0", ""));
        let nodes = resolve(tmp.path(), &[compile("org.a:a:1.0")], &BTreeMap::new()).unwrap();
        assert_eq!(
            ids(&nodes),
            ["org.a:a:jar:1.0:compile", "org.x:gone:jar:1.0:compile"]
        );
    }
}
