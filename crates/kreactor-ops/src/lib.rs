pub mod ops_common;
pub mod ops_list;
pub mod ops_order;
pub mod ops_tree;
pub mod session;

pub use session::{Overrides, Session};

/// Output format shared by the listing operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Serialize a value as pretty JSON for stdout.
pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> miette::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        kreactor_util::errors::KreactorError::Generic {
            message: format!("Failed to serialize output: {e}"),
        }
        .into()
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::Path;

    pub fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// A two-module reactor where `web` depends on `core`.
    pub fn reactor(root: &Path) {
        write(
            &root.join("pom.xml"),
            "<project><groupId>com.acme</groupId><artifactId>parent</artifactId>\
             <version>1.0</version><packaging>pom</packaging>\
             <modules><module>core</module><module>web</module></modules></project>",
        );
        write(
            &root.join("core/pom.xml"),
            "<project><parent><groupId>com.acme</groupId><artifactId>parent</artifactId>\
             <version>1.0</version></parent><artifactId>core</artifactId>\
             <dependencies><dependency><groupId>org.lib</groupId><artifactId>util</artifactId>\
             <version>2.0</version></dependency></dependencies></project>",
        );
        write(
            &root.join("web/pom.xml"),
            "<project><parent><groupId>com.acme</groupId><artifactId>parent</artifactId>\
             <version>1.0</version></parent><artifactId>web</artifactId>\
             <dependencies><dependency><groupId>com.acme</groupId><artifactId>core</artifactId>\
             <version>1.0</version></dependency></dependencies></project>",
        );
    }

    /// Install `org.lib:util:2.0` with one transitive dependency.
    pub fn repository(root: &Path) {
        write(
            &root.join("org/lib/util/2.0/util-2.0.pom"),
            "<project><groupId>org.lib</groupId><artifactId>util</artifactId><version>2.0</version>\
             <dependencies><dependency><groupId>org.lib</groupId><artifactId>text</artifactId>\
             <version>1.1</version></dependency></dependencies></project>",
        );
        write(
            &root.join("org/lib/text/1.1/text-1.1.pom"),
            "<project><groupId>org.lib</groupId><artifactId>text</artifactId><version>1.1</version></project>",
        );
    }

    pub fn overrides(repo: &Path) -> crate::Overrides {
        crate::Overrides {
            config_path: Some(repo.join("no-config.toml")),
            local_repo: Some(repo.to_path_buf()),
            ..Default::default()
        }
    }
}
