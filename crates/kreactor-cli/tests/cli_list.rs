mod common;

use predicates::prelude::*;
use tempfile::TempDir;

use common::{install, kreactor_cmd, reactor};

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    reactor(
        tmp.path(),
        &[
            ("core", &["org.lib:log:1.0", "org.lib:json:2.0"]),
            ("web", &["com.acme:core:1.0", "org.lib:log:1.0"]),
        ],
    );
    install(tmp.path(), "org.lib:log:1.0", &[]);
    install(tmp.path(), "org.lib:json:2.0", &["org.lib:text:1.1"]);
    install(tmp.path(), "org.lib:text:1.1", &[]);
    tmp
}

#[test]
fn test_list_prints_every_module() {
    let tmp = project();

    kreactor_cmd(tmp.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Listing core com.acme:core:jar:1.0"))
        .stdout(predicate::str::contains("Listing web com.acme:web:jar:1.0"))
        .stdout(predicate::str::contains("   com.acme:core:jar:1.0:compile"))
        .stdout(predicate::str::contains("   org.lib:text:jar:1.1:compile"));
}

#[test]
fn test_list_single_module_in_order() {
    let tmp = project();

    let output = kreactor_cmd(tmp.path())
        .args(["list", "--module", "web"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout
        .lines()
        .filter(|l| l.starts_with("   "))
        .map(str::trim)
        .collect();
    assert_eq!(
        lines,
        [
            "com.acme:core:jar:1.0:compile",
            "org.lib:json:jar:2.0:compile",
            "org.lib:log:jar:1.0:compile",
            "org.lib:text:jar:1.1:compile",
        ]
    );
}

#[test]
fn test_list_json() {
    let tmp = project();

    kreactor_cmd(tmp.path())
        .args(["list", "--format", "json", "--module", "core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"module\": \"com.acme:core:jar:1.0\""))
        .stdout(predicate::str::contains("\"artifactId\": \"json\""));
}

#[test]
fn test_common_factors_shared_dependencies() {
    let tmp = project();
    // Give the aggregator the shared dependency as well.
    common::write(
        &tmp.path().join("pom.xml"),
        "<project><groupId>com.acme</groupId><artifactId>parent</artifactId>\
         <version>1.0</version><packaging>pom</packaging>\
         <modules><module>core</module><module>web</module></modules>\
         <dependencies><dependency><groupId>org.lib</groupId><artifactId>log</artifactId>\
         <version>1.0</version></dependency></dependencies></project>",
    );

    kreactor_cmd(tmp.path())
        .args(["common"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shared by all 3 modules (1):"))
        .stdout(predicate::str::contains("   org.lib:log:jar:1.0:compile"))
        .stdout(predicate::str::contains("com.acme:core:jar:1.0 also uses:"));
}

#[test]
fn test_list_reactor_only_skips_repository() {
    let tmp = project();
    std::fs::remove_dir_all(tmp.path().join("repo")).unwrap();

    kreactor_cmd(tmp.path())
        .args(["--reactor-only", "list", "--module", "core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org.lib:json:jar:2.0:compile"))
        .stdout(predicate::str::contains("org.lib:text").not());
}

#[test]
fn test_list_missing_dependency_fails_unless_degraded() {
    let tmp = project();
    std::fs::remove_dir_all(tmp.path().join("repo/org/lib/json")).unwrap();

    kreactor_cmd(tmp.path())
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dependency resolution failed"));

    kreactor_cmd(tmp.path())
        .args(["--degrade", "list", "--module", "core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resolution degraded"))
        .stdout(predicate::str::contains("org.lib:json:jar:2.0:compile"));
}

#[test]
fn test_list_without_pom_fails() {
    let tmp = TempDir::new().unwrap();

    kreactor_cmd(tmp.path())
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Descriptor error"));
}
