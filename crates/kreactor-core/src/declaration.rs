use serde::{Deserialize, Serialize};

use crate::artifact::{Scope, DEFAULT_TYPE};

/// A dependency as written in a module descriptor, before conversion into an
/// [`Artifact`](crate::artifact::Artifact).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    pub group: String,
    pub artifact: String,
    /// Raw version or version range; validated during conversion.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default = "default_type", rename = "type")]
    pub type_: String,
    /// `None` means the default scope, compile.
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub exclusions: Vec<Exclusion>,
    #[serde(default, rename = "system-path")]
    pub system_path: Option<String>,
}

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

/// A transitive dependency to exclude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub group: String,
    /// `None` excludes every artifact of the group.
    #[serde(default)]
    pub artifact: Option<String>,
}

impl Exclusion {
    /// The `group:artifact` pattern this exclusion matches.
    pub fn pattern(&self) -> String {
        format!("{}:{}", self.group, self.artifact.as_deref().unwrap_or("*"))
    }
}

impl DependencyDeclaration {
    /// A compile-scoped `jar` declaration.
    pub fn new(group: &str, artifact: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            classifier: None,
            type_: default_type(),
            scope: None,
            optional: false,
            exclusions: Vec::new(),
            system_path: None,
        }
    }

    /// Parse `"group:artifact:version"` or `"group:artifact:version:scope"`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [g, a, v] if !g.is_empty() && !a.is_empty() => Some(Self::new(g, a, v)),
            [g, a, v, scope] if !g.is_empty() && !a.is_empty() => {
                Some(Self::new(g, a, v).with_scope(scope.parse().ok()?))
            }
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
        self.classifier = Some(classifier.to_string());
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn excluding(mut self, group: &str, artifact: &str) -> Self {
        self.exclusions.push(Exclusion {
            group: group.to_string(),
            artifact: Some(artifact.to_string()),
        });
        self
    }

    pub fn with_system_path(mut self, path: &str) -> Self {
        self.system_path = Some(path.to_string());
        self
    }

    /// `group:artifact` for messages.
    pub fn key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl std::fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}
