//! POM file parsing: dependency declarations, parent inheritance, property interpolation.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use kreactor_core::artifact::{Scope, DEFAULT_TYPE};
use kreactor_core::declaration::{DependencyDeclaration, Exclusion};
use kreactor_core::module::RemoteRepository;
use kreactor_util::errors::{KreactorError, KreactorResult};

/// A parsed POM (Project Object Model) file.
#[derive(Debug, Clone, Default)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub name: Option<String>,

    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<PomDependency>,
    pub dependency_management: Vec<PomDependency>,
    pub modules: Vec<String>,
    pub repositories: Vec<PomRepository>,
}

/// Reference to a parent POM.
#[derive(Debug, Clone)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub relative_path: Option<String>,
}

/// A dependency declared in a POM file.
#[derive(Debug, Clone)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub optional: bool,
    pub classifier: Option<String>,
    pub type_: Option<String>,
    pub system_path: Option<String>,
    pub exclusions: Vec<PomExclusion>,
}

/// An exclusion within a dependency declaration.
#[derive(Debug, Clone)]
pub struct PomExclusion {
    pub group_id: String,
    pub artifact_id: Option<String>,
}

/// A `<repository>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomRepository {
    pub id: String,
    pub url: String,
}

impl PomDependency {
    fn empty() -> Self {
        Self {
            group_id: String::new(),
            artifact_id: String::new(),
            version: None,
            scope: None,
            optional: false,
            classifier: None,
            type_: None,
            system_path: None,
            exclusions: Vec::new(),
        }
    }

    pub fn type_or_default(&self) -> &str {
        self.type_.as_deref().unwrap_or(DEFAULT_TYPE)
    }

    /// `group:artifact:type[:classifier]`, the key managed versions use.
    pub fn conflict_key(&self) -> String {
        match self.classifier.as_deref().filter(|c| !c.is_empty()) {
            Some(c) => format!(
                "{}:{}:{}:{c}",
                self.group_id,
                self.artifact_id,
                self.type_or_default()
            ),
            None => format!(
                "{}:{}:{}",
                self.group_id,
                self.artifact_id,
                self.type_or_default()
            ),
        }
    }

    /// Parsed scope; `None` when absent.
    pub fn parsed_scope(&self) -> Result<Option<Scope>, kreactor_core::artifact::UnknownScope> {
        self.scope.as_deref().map(str::parse).transpose()
    }

    /// Convert into a descriptor-independent declaration.
    pub fn to_declaration(&self) -> Result<DependencyDeclaration, kreactor_core::artifact::UnknownScope> {
        let mut decl = DependencyDeclaration::new(
            &self.group_id,
            &self.artifact_id,
            self.version.as_deref().unwrap_or(""),
        )
        .with_type(self.type_or_default())
        .with_optional(self.optional);
        if let Some(classifier) = self.classifier.as_deref().filter(|c| !c.is_empty()) {
            decl = decl.with_classifier(classifier);
        }
        if let Some(scope) = self.parsed_scope()? {
            decl = decl.with_scope(scope);
        }
        if let Some(path) = self.system_path.as_deref() {
            decl = decl.with_system_path(path);
        }
        decl.exclusions = self
            .exclusions
            .iter()
            .map(|e| Exclusion {
                group: e.group_id.clone(),
                artifact: e.artifact_id.clone().filter(|a| a != "*"),
            })
            .collect();
        Ok(decl)
    }
}

impl Pom {
    /// Effective group ID (falls back to parent).
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    /// Effective version (falls back to parent).
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.version.as_str()))
    }

    pub fn effective_packaging(&self) -> &str {
        self.packaging.as_deref().unwrap_or(DEFAULT_TYPE)
    }

    /// Resolve `${property}` references in a string using POM properties
    /// and built-in project variables.
    pub fn interpolate(&self, input: &str) -> String {
        let mut result = input.to_string();
        let mut iterations = 0;
        while result.contains("${") && iterations < 20 {
            iterations += 1;
            let mut new = result.clone();
            let mut from = 0;
            while let Some(offset) = new[from..].find("${") {
                let start = from + offset;
                let Some(end) = new[start..].find('}') else {
                    break;
                };
                let key = &new[start + 2..start + end];
                match self.resolve_property(key) {
                    Some(val) => {
                        new = format!("{}{}{}", &new[..start], val, &new[start + end + 1..]);
                        from = start + val.len();
                    }
                    None => from = start + end + 1,
                }
            }
            if new == result {
                break;
            }
            result = new;
        }
        result
    }

    fn resolve_property(&self, key: &str) -> Option<String> {
        match key {
            "project.groupId" | "pom.groupId" => self.effective_group_id().map(|s| s.to_string()),
            "project.artifactId" | "pom.artifactId" => self.artifact_id.clone(),
            "project.version" | "pom.version" => self.effective_version().map(|s| s.to_string()),
            "project.packaging" | "pom.packaging" => self.packaging.clone(),
            "project.parent.groupId" => self.parent.as_ref().map(|p| p.group_id.clone()),
            "project.parent.version" => self.parent.as_ref().map(|p| p.version.clone()),
            _ => self.properties.get(key).cloned(),
        }
    }

    /// Interpolate all property references in dependencies, dependency
    /// management and repositories.
    pub fn resolve_properties(&mut self) {
        let pom_snapshot = self.clone();
        let interpolate_dep = |dep: &mut PomDependency| {
            dep.group_id = pom_snapshot.interpolate(&dep.group_id);
            dep.artifact_id = pom_snapshot.interpolate(&dep.artifact_id);
            for field in [
                &mut dep.version,
                &mut dep.scope,
                &mut dep.classifier,
                &mut dep.type_,
                &mut dep.system_path,
            ] {
                if let Some(v) = field.as_mut() {
                    *v = pom_snapshot.interpolate(v);
                }
            }
        };
        self.dependencies.iter_mut().for_each(interpolate_dep);
        self.dependency_management.iter_mut().for_each(interpolate_dep);
        for repo in &mut self.repositories {
            repo.url = pom_snapshot.interpolate(&repo.url);
        }
    }

    /// Merge a parent POM into this one: properties, coordinates, dependency
    /// management, dependencies and repositories. Values declared here take
    /// precedence.
    pub fn apply_parent(&mut self, parent: &Pom) {
        for (k, v) in &parent.properties {
            self.properties
                .entry(k.clone())
                .or_insert_with(|| v.clone());
        }
        if self.group_id.is_none() {
            self.group_id = parent.effective_group_id().map(|s| s.to_string());
        }
        if self.version.is_none() {
            self.version = parent.effective_version().map(|s| s.to_string());
        }
        for dm in &parent.dependency_management {
            let dominated = self
                .dependency_management
                .iter()
                .any(|d| d.conflict_key() == dm.conflict_key());
            if !dominated {
                self.dependency_management.push(dm.clone());
            }
        }
        for dep in &parent.dependencies {
            let declared = self
                .dependencies
                .iter()
                .any(|d| d.conflict_key() == dep.conflict_key());
            if !declared {
                self.dependencies.push(dep.clone());
            }
        }
        for repo in &parent.repositories {
            if !self.repositories.iter().any(|r| r.id == repo.id) {
                self.repositories.push(repo.clone());
            }
        }
    }

    /// Look up a version from dependency management by conflict key.
    pub fn managed_version(&self, conflict_key: &str) -> Option<&str> {
        self.dependency_management
            .iter()
            .find(|d| d.conflict_key() == conflict_key)
            .and_then(|d| d.version.as_deref())
    }

    /// Dependency management as a conflict key to version map. BOM imports
    /// are not versions of anything and are left out.
    pub fn managed_versions(&self) -> BTreeMap<String, String> {
        self.dependency_management
            .iter()
            .filter(|d| d.scope.as_deref() != Some("import"))
            .filter_map(|d| Some((d.conflict_key(), d.version.clone()?)))
            .collect()
    }

    pub fn remote_repositories(&self) -> Vec<RemoteRepository> {
        self.repositories
            .iter()
            .map(|r| RemoteRepository {
                id: r.id.clone(),
                url: r.url.clone(),
            })
            .collect()
    }
}

/// Read and parse a POM file, tagging errors with its path.
pub fn read_pom(path: &Path) -> KreactorResult<Pom> {
    let content = kreactor_util::fs::read_to_string(path)?;
    parse_pom(&content).map_err(|e| KreactorError::Descriptor {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Parse a POM XML string into a `Pom` struct.
pub fn parse_pom(xml: &str) -> KreactorResult<Pom> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pom = Pom::default();
    let mut path: Vec<String> = Vec::new();
    let mut text_buf = String::new();

    // Temporary accumulators for nested elements
    let mut current_dep: Option<PomDependency> = None;
    let mut current_exclusion: Option<PomExclusion> = None;
    let mut current_parent: Option<ParentRef> = None;
    let mut current_repo: Option<PomRepository> = None;
    let mut in_dep_mgmt = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                path.push(tag);
                text_buf.clear();

                let ctx = path_context(&path);
                match ctx.as_str() {
                    "project>dependencyManagement>dependencies>dependency"
                    | "project>dependencies>dependency" => {
                        in_dep_mgmt = ctx.contains("dependencyManagement");
                        current_dep = Some(PomDependency::empty());
                    }
                    _ if ctx.ends_with(">exclusion") && current_dep.is_some() => {
                        current_exclusion = Some(PomExclusion {
                            group_id: String::new(),
                            artifact_id: None,
                        });
                    }
                    "project>parent" => {
                        current_parent = Some(ParentRef {
                            group_id: String::new(),
                            artifact_id: String::new(),
                            version: String::new(),
                            relative_path: None,
                        });
                    }
                    "project>repositories>repository" => {
                        current_repo = Some(PomRepository {
                            id: String::new(),
                            url: String::new(),
                        });
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                text_buf = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::End(_)) => {
                let ctx = path_context(&path);
                let depth = path.len();

                // Properties: <project><properties><key>value</key></properties>
                if depth == 3 && path.get(1).map(|s| s.as_str()) == Some("properties") {
                    let prop_name = path.last().cloned().unwrap_or_default();
                    pom.properties.insert(prop_name, text_buf.clone());
                }

                if let Some(ref mut dep) = current_dep {
                    if let Some(ref mut excl) = current_exclusion {
                        match path.last().map(|s| s.as_str()) {
                            Some("groupId") => excl.group_id = text_buf.clone(),
                            Some("artifactId") => excl.artifact_id = Some(text_buf.clone()),
                            _ => {}
                        }
                        if ctx.ends_with(">exclusion") {
                            if let Some(excl) = current_exclusion.take() {
                                dep.exclusions.push(excl);
                            }
                        }
                    } else if let Some(field) = ctx.rsplit_once(">dependency>").map(|(_, f)| f) {
                        match field {
                            "groupId" => dep.group_id = text_buf.clone(),
                            "artifactId" => dep.artifact_id = text_buf.clone(),
                            "version" => dep.version = Some(text_buf.clone()),
                            "scope" => dep.scope = Some(text_buf.clone()),
                            "optional" => dep.optional = text_buf.trim() == "true",
                            "classifier" => dep.classifier = Some(text_buf.clone()),
                            "type" => dep.type_ = Some(text_buf.clone()),
                            "systemPath" => dep.system_path = Some(text_buf.clone()),
                            _ => {}
                        }
                    }

                    if ctx == "project>dependencies>dependency"
                        || ctx == "project>dependencyManagement>dependencies>dependency"
                    {
                        if let Some(dep) = current_dep.take() {
                            if in_dep_mgmt {
                                pom.dependency_management.push(dep);
                            } else {
                                pom.dependencies.push(dep);
                            }
                        }
                        in_dep_mgmt = false;
                    }
                }

                if let Some(ref mut parent) = current_parent {
                    match ctx.as_str() {
                        "project>parent>groupId" => parent.group_id = text_buf.clone(),
                        "project>parent>artifactId" => parent.artifact_id = text_buf.clone(),
                        "project>parent>version" => parent.version = text_buf.clone(),
                        "project>parent>relativePath" => {
                            parent.relative_path = Some(text_buf.clone())
                        }
                        "project>parent" => pom.parent = current_parent.take(),
                        _ => {}
                    }
                }

                if let Some(ref mut repo) = current_repo {
                    match ctx.as_str() {
                        "project>repositories>repository>id" => repo.id = text_buf.clone(),
                        "project>repositories>repository>url" => repo.url = text_buf.clone(),
                        "project>repositories>repository" => {
                            if let Some(repo) = current_repo.take() {
                                pom.repositories.push(repo);
                            }
                        }
                        _ => {}
                    }
                }

                // Top-level project fields
                if depth == 2 {
                    match path.last().map(|s| s.as_str()) {
                        Some("groupId") => pom.group_id = Some(text_buf.clone()),
                        Some("artifactId") => pom.artifact_id = Some(text_buf.clone()),
                        Some("version") => pom.version = Some(text_buf.clone()),
                        Some("packaging") => pom.packaging = Some(text_buf.clone()),
                        Some("name") => pom.name = Some(text_buf.clone()),
                        _ => {}
                    }
                }

                if ctx == "project>modules>module" {
                    pom.modules.push(text_buf.clone());
                }

                path.pop();
                text_buf.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(KreactorError::Generic {
                    message: format!("Failed to parse POM XML: {e}"),
                });
            }
            _ => {}
        }
    }

    if path.first().is_some() {
        return Err(KreactorError::Generic {
            message: "Failed to parse POM XML: unexpected end of document".to_string(),
        });
    }
    Ok(pom)
}

/// Build a context string from the current XML path for matching.
fn path_context(path: &[String]) -> String {
    path.join(">")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <groupId>com.acme</groupId>
    <artifactId>acme-lib</artifactId>
    <version>1.0.0</version>
    <packaging>jar</packaging>

    <properties>
        <acme-base.version>33.0.0-jre</acme-base.version>
    </properties>

    <dependencies>
        <dependency>
            <groupId>com.acme.base</groupId>
            <artifactId>acme-base</artifactId>
            <version>${acme-base.version}</version>
        </dependency>
        <dependency>
            <groupId>junit</groupId>
            <artifactId>junit</artifactId>
            <version>4.13.2</version>
            <scope>test</scope>
        </dependency>
    </dependencies>
</project>"#;

    #[test]
    fn parse_simple_pom() {
        let pom = parse_pom(SIMPLE_POM).unwrap();
        assert_eq!(pom.group_id.as_deref(), Some("com.acme"));
        assert_eq!(pom.artifact_id.as_deref(), Some("acme-lib"));
        assert_eq!(pom.version.as_deref(), Some("1.0.0"));
        assert_eq!(pom.effective_packaging(), "jar");
        assert_eq!(pom.dependencies.len(), 2);
        assert_eq!(pom.properties.get("acme-base.version").unwrap(), "33.0.0-jre");
    }

    #[test]
    fn property_interpolation() {
        let mut pom = parse_pom(SIMPLE_POM).unwrap();
        pom.resolve_properties();
        assert_eq!(pom.dependencies[0].version.as_deref(), Some("33.0.0-jre"));
    }

    #[test]
    fn unknown_property_is_left_alone() {
        let mut pom = parse_pom(SIMPLE_POM).unwrap();
        pom.properties.insert("a".into(), "x".into());
        assert_eq!(pom.interpolate("${missing}-${a}"), "${missing}-x");
    }

    #[test]
    fn scope_parsing() {
        let pom = parse_pom(SIMPLE_POM).unwrap();
        assert_eq!(pom.dependencies[0].scope, None);
        let junit = pom.dependencies[1].to_declaration().unwrap();
        assert_eq!(junit.scope, Some(Scope::Test));
    }

    #[test]
    fn unknown_scope_rejected() {
        let mut dep = PomDependency::empty();
        dep.scope = Some("shaded".to_string());
        assert!(dep.to_declaration().is_err());
    }

    #[test]
    fn dependency_management() {
        let xml = r#"<?xml version="1.0"?>
<project>
    <groupId>com.acme</groupId>
    <artifactId>parent</artifactId>
    <version>1.0.0</version>

    <dependencyManagement>
        <dependencies>
            <dependency>
                <groupId>com.acme</groupId>
                <artifactId>platform-bom</artifactId>
                <version>1.8.0</version>
                <type>pom</type>
                <scope>import</scope>
            </dependency>
            <dependency>
                <groupId>com.acme.base</groupId>
                <artifactId>acme-base</artifactId>
                <version>32.0.0-jre</version>
            </dependency>
        </dependencies>
    </dependencyManagement>
</project>"#;
        let pom = parse_pom(xml).unwrap();
        assert_eq!(pom.dependency_management.len(), 2);
        assert!(pom.dependencies.is_empty());
        assert_eq!(
            pom.managed_version("com.acme.base:acme-base:jar"),
            Some("32.0.0-jre")
        );
        let managed = pom.managed_versions();
        assert_eq!(managed.len(), 1);
        assert_eq!(managed["com.acme.base:acme-base:jar"], "32.0.0-jre");
    }

    #[test]
    fn parent_ref_parsing() {
        let xml = r#"<?xml version="1.0"?>
<project>
    <parent>
        <groupId>com.acme</groupId>
        <artifactId>parent-pom</artifactId>
        <version>2.0.0</version>
        <relativePath>../parent/pom.xml</relativePath>
    </parent>
    <artifactId>child</artifactId>
</project>"#;
        let pom = parse_pom(xml).unwrap();
        assert_eq!(pom.effective_group_id(), Some("com.acme"));
        assert_eq!(pom.effective_version(), Some("2.0.0"));
        let p = pom.parent.as_ref().unwrap();
        assert_eq!(p.artifact_id, "parent-pom");
        assert_eq!(p.relative_path.as_deref(), Some("../parent/pom.xml"));
        // The parent's coordinates are not the child's.
        assert_eq!(pom.artifact_id.as_deref(), Some("child"));
    }

    #[test]
    fn exclusions_classifier_and_system_path() {
        let xml = r#"<?xml version="1.0"?>
<project>
    <groupId>com.acme</groupId>
    <artifactId>app</artifactId>
    <version>1.0</version>
    <dependencies>
        <dependency>
            <groupId>com.example</groupId>
            <artifactId>lib</artifactId>
            <version>1.0</version>
            <classifier>jdk8</classifier>
            <optional>true</optional>
            <exclusions>
                <exclusion>
                    <groupId>acme-logging</groupId>
                    <artifactId>acme-logging</artifactId>
                </exclusion>
                <exclusion>
                    <groupId>org.slf4j</groupId>
                    <artifactId>*</artifactId>
                </exclusion>
            </exclusions>
        </dependency>
        <dependency>
            <groupId>com.sun</groupId>
            <artifactId>tools</artifactId>
            <version>1.8</version>
            <scope>system</scope>
            <systemPath>/opt/jdk/lib/tools.jar</systemPath>
        </dependency>
    </dependencies>
</project>"#;
        let pom = parse_pom(xml).unwrap();
        let lib = pom.dependencies[0].to_declaration().unwrap();
        assert_eq!(lib.classifier.as_deref(), Some("jdk8"));
        assert!(lib.optional);
        let patterns: Vec<String> = lib.exclusions.iter().map(|e| e.pattern()).collect();
        assert_eq!(patterns, ["acme-logging:acme-logging", "org.slf4j:*"]);
        // The exclusion's artifactId does not leak into the dependency.
        assert_eq!(lib.artifact, "lib");

        let tools = pom.dependencies[1].to_declaration().unwrap();
        assert_eq!(tools.scope, Some(Scope::System));
        assert_eq!(tools.system_path.as_deref(), Some("/opt/jdk/lib/tools.jar"));
    }

    #[test]
    fn modules_and_repositories() {
        let xml = r#"<?xml version="1.0"?>
<project>
    <groupId>com.acme</groupId>
    <artifactId>root</artifactId>
    <version>1.0</version>
    <packaging>pom</packaging>
    <modules>
        <module>core</module>
        <module>web</module>
    </modules>
    <repositories>
        <repository>
            <id>internal</id>
            <url>https://repo.example.org/maven</url>
        </repository>
    </repositories>
</project>"#;
        let pom = parse_pom(xml).unwrap();
        assert_eq!(pom.modules, ["core", "web"]);
        assert_eq!(
            pom.remote_repositories(),
            [RemoteRepository {
                id: "internal".into(),
                url: "https://repo.example.org/maven".into()
            }]
        );
    }

    #[test]
    fn apply_parent_fills_gaps() {
        let parent = parse_pom(
            r#"<project>
    <groupId>com.acme</groupId>
    <artifactId>parent</artifactId>
    <version>2.0</version>
    <properties><lib.version>1.5</lib.version></properties>
    <dependencyManagement><dependencies><dependency>
        <groupId>org.x</groupId><artifactId>lib</artifactId><version>${lib.version}</version>
    </dependency></dependencies></dependencyManagement>
    <dependencies><dependency>
        <groupId>org.x</groupId><artifactId>log</artifactId><version>1.0</version>
    </dependency></dependencies>
</project>"#,
        )
        .unwrap();
        let mut child = parse_pom(
            r#"<project>
    <parent><groupId>com.acme</groupId><artifactId>parent</artifactId><version>2.0</version></parent>
    <artifactId>child</artifactId>
</project>"#,
        )
        .unwrap();
        child.apply_parent(&parent);
        child.resolve_properties();
        assert_eq!(child.group_id.as_deref(), Some("com.acme"));
        assert_eq!(child.version.as_deref(), Some("2.0"));
        assert_eq!(child.managed_version("org.x:lib:jar"), Some("1.5"));
        assert_eq!(child.dependencies.len(), 1);
        assert_eq!(child.dependencies[0].artifact_id, "log");
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_pom("<project><groupId>x</project>").is_err());
        assert!(parse_pom("<project><groupId>x</groupId>").is_err());
    }
}
