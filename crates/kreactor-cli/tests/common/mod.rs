#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;

#[allow(deprecated)]
pub fn kreactor_cmd(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kreactor").unwrap();
    cmd.current_dir(project)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .args(["--config"])
        .arg(project.join("no-such-config.toml"))
        .args(["--local-repo"])
        .arg(project.join("repo"));
    cmd
}

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn dependency(coord: &str) -> String {
    let parts: Vec<&str> = coord.split(':').collect();
    format!(
        "<dependency><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version></dependency>",
        parts[0], parts[1], parts[2]
    )
}

/// Root aggregator with `modules`, each given as (artifactId, dependencies).
pub fn reactor(root: &Path, modules: &[(&str, &[&str])]) {
    let names: String = modules
        .iter()
        .map(|(name, _)| format!("<module>{name}</module>"))
        .collect();
    write(
        &root.join("pom.xml"),
        &format!(
            "<project><groupId>com.acme</groupId><artifactId>parent</artifactId>\
             <version>1.0</version><packaging>pom</packaging>\
             <modules>{names}</modules></project>"
        ),
    );
    for (name, deps) in modules {
        let deps: String = deps.iter().map(|d| dependency(d)).collect();
        write(
            &root.join(name).join("pom.xml"),
            &format!(
                "<project><parent><groupId>com.acme</groupId><artifactId>parent</artifactId>\
                 <version>1.0</version></parent><artifactId>{name}</artifactId>\
                 <dependencies>{deps}</dependencies></project>"
            ),
        );
    }
}

/// Install a POM into the local repository under `root/repo`.
pub fn install(root: &Path, coord: &str, deps: &[&str]) {
    let parts: Vec<&str> = coord.split(':').collect();
    let (g, a, v) = (parts[0], parts[1], parts[2]);
    let deps: String = deps.iter().map(|d| dependency(d)).collect();
    write(
        &root
            .join("repo")
            .join(g.replace('.', "/"))
            .join(a)
            .join(v)
            .join(format!("{a}-{v}.pom")),
        &format!(
            "<project><groupId>{g}</groupId><artifactId>{a}</artifactId><version>{v}</version>\
             <dependencies>{deps}</dependencies></project>"
        ),
    );
}
