//! Artifact coordinates, scopes and exclusion filters.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Packaging type assumed when a declaration or module does not name one.
pub const DEFAULT_TYPE: &str = "jar";

/// Maven-compatible dependency scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Compile,
    Provided,
    Runtime,
    Test,
    System,
}

impl Default for Scope {
    fn default() -> Self {
        Self::Compile
    }
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Provided => "provided",
            Scope::Runtime => "runtime",
            Scope::Test => "test",
            Scope::System => "system",
        }
    }

    /// Whether dependencies reached through this scope are expanded further.
    pub fn is_transitive(&self) -> bool {
        matches!(self, Scope::Compile | Scope::Runtime)
    }

    /// Effective scope of a dependency declared with `own` scope when it is
    /// reached through a path whose ambient scope is `inherited`.
    ///
    /// Returns `None` when the dependency must be dropped: test and provided
    /// dependencies never travel past the module that declares them. An
    /// inherited test or provided scope overrides compile and runtime.
    ///
    /// | own \ inherited | none | compile | runtime | test | provided | system |
    /// |---|---|---|---|---|---|---|
    /// | compile  | compile | compile | runtime | test | provided | runtime |
    /// | runtime  | runtime | runtime | runtime | test | provided | runtime |
    /// | test     | test | - | - | - | - | - |
    /// | provided | provided | - | - | - | - | - |
    /// | system   | system | system | system | system | system | system |
    pub fn inherit(own: Scope, inherited: Option<Scope>) -> Option<Scope> {
        let Some(inherited) = inherited else {
            return Some(own);
        };
        match (own, inherited) {
            (Scope::Test | Scope::Provided, _) => None,
            (Scope::System, _) => Some(Scope::System),
            (_, Scope::Test) => Some(Scope::Test),
            (_, Scope::Provided) => Some(Scope::Provided),
            (Scope::Compile, Scope::Compile) => Some(Scope::Compile),
            (Scope::Compile | Scope::Runtime, _) => Some(Scope::Runtime),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a scope string is not one of the five Maven scopes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope '{0}'")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compile" => Ok(Scope::Compile),
            "provided" => Ok(Scope::Provided),
            "runtime" => Ok(Scope::Runtime),
            "test" => Ok(Scope::Test),
            "system" => Ok(Scope::System),
            _ => Err(UnknownScope(s.to_string())),
        }
    }
}

/// A set of `group:artifact` patterns whose matches are dropped from a
/// dependency's transitive subtree. `group:*` excludes a whole group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionFilter {
    patterns: BTreeSet<String>,
}

impl ExclusionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from `group:artifact` patterns.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, pattern: impl Into<String>) {
        self.patterns.insert(pattern.into());
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// Whether `group:artifact` is matched by one of the patterns.
    pub fn excludes(&self, group: &str, artifact_id: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        self.patterns.contains(&format!("{group}:{artifact_id}"))
            || self.patterns.contains(&format!("{group}:*"))
            || self.patterns.contains("*:*")
    }

    /// Union of two filters.
    pub fn union(&self, other: &ExclusionFilter) -> ExclusionFilter {
        let mut patterns = self.patterns.clone();
        patterns.extend(other.patterns.iter().cloned());
        ExclusionFilter { patterns }
    }
}

/// An artifact coordinate together with the resolution attributes carried
/// along a dependency edge.
///
/// Two derived keys identify an artifact:
/// - [`Artifact::full_id`]: `group:artifactId:type[:classifier]:version`
/// - [`Artifact::conflict_key`]: the same without the version, naming the
///   slot that competing versions fight over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub group: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    /// `None` for module coordinates, which are resolution roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "ExclusionFilter::is_empty")]
    pub exclusions: ExclusionFilter,
    /// Local file for system-scoped artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_path: Option<PathBuf>,
}

impl Artifact {
    /// A `jar` artifact without scope, classifier or exclusions.
    pub fn new(group: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            classifier: None,
            type_: DEFAULT_TYPE.to_string(),
            scope: None,
            optional: false,
            exclusions: ExclusionFilter::default(),
            system_path: None,
        }
    }

    /// Parse `group:artifact:version`, `group:artifact:type:version` or
    /// `group:artifact:type:classifier:version`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [g, a, v] => Some(Self::new(g, a, v)),
            [g, a, t, v] => Some(Self::new(g, a, v).with_type(t)),
            [g, a, t, c, v] => Some(Self::new(g, a, v).with_type(t).with_classifier(c)),
            _ => None,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_type(mut self, type_: &str) -> Self {
        self.type_ = type_.to_string();
        self
    }

    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = Some(classifier.to_string()).filter(|c| !c.is_empty());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionFilter) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// `group:artifactId:type[:classifier]` (version-independent).
    pub fn conflict_key(&self) -> String {
        match self.classifier.as_deref() {
            Some(c) => format!("{}:{}:{}:{}", self.group, self.artifact_id, self.type_, c),
            None => format!("{}:{}:{}", self.group, self.artifact_id, self.type_),
        }
    }

    /// `group:artifactId:type[:classifier]:version` (exact identity).
    pub fn full_id(&self) -> String {
        format!("{}:{}", self.conflict_key(), self.version)
    }

    /// `group:artifactId`, the form used by exclusion patterns.
    pub fn management_key(&self) -> String {
        format!("{}:{}", self.group, self.artifact_id)
    }

    /// Scope to report for this artifact; module coordinates report compile.
    pub fn effective_scope(&self) -> Scope {
        self.scope.unwrap_or_default()
    }

    /// Whether `other` names the same artifact, ignoring the resolution
    /// attributes (scope, optional flag, exclusions).
    pub fn same_coordinate(&self, other: &Artifact) -> bool {
        self.full_id() == other.full_id()
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Some(scope) => write!(f, "{}:{}", self.full_id(), scope),
            None => f.write_str(&self.full_id()),
        }
    }
}
