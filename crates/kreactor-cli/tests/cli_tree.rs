mod common;

use predicates::prelude::*;
use tempfile::TempDir;

use common::{kreactor_cmd, reactor};

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    reactor(
        tmp.path(),
        &[
            ("web", &["com.acme:service:1.0"]),
            ("service", &["com.acme:model:1.0"]),
            ("model", &[]),
        ],
    );
    tmp
}

#[test]
fn test_tree_shows_module_dependencies() {
    let tmp = project();

    kreactor_cmd(tmp.path())
        .args(["tree", "--module", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "com.acme:web:jar:1.0\n└── com.acme:service:jar:1.0 (compile)\n    └── com.acme:model:jar:1.0 (compile)\n",
        ));
}

#[test]
fn test_tree_depth_limit() {
    let tmp = project();

    kreactor_cmd(tmp.path())
        .args(["tree", "--module", "web", "--depth", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme:model").not());
}

#[test]
fn test_tree_inverted() {
    let tmp = project();

    kreactor_cmd(tmp.path())
        .args(["tree", "--module", "model", "--inverted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<- com.acme:service:jar:1.0"));
}

#[test]
fn test_tree_conflicts_none() {
    let tmp = project();

    kreactor_cmd(tmp.path())
        .args(["--reactor-only", "tree", "--conflicts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No version conflicts."));
}

#[test]
fn test_tree_conflicts_nearest_wins() {
    let tmp = TempDir::new().unwrap();
    reactor(
        tmp.path(),
        &[
            ("core", &["org.lib:log:1.0"]),
            ("web", &["org.lib:log:2.0", "com.acme:core:1.0"]),
        ],
    );

    kreactor_cmd(tmp.path())
        .args(["--reactor-only", "tree", "--conflicts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Version conflicts (1):"))
        .stdout(predicate::str::contains("kept 2.0, omitted 1.0"));
}

#[test]
fn test_order_puts_dependencies_first() {
    let tmp = project();

    let output = kreactor_cmd(tmp.path()).args(["order"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let model = stdout.find("com.acme:model:jar:1.0").unwrap();
    let service = stdout.find("com.acme:service:jar:1.0").unwrap();
    let web = stdout.find("com.acme:web:jar:1.0").unwrap();
    assert!(model < service && service < web);
}

#[test]
fn test_cycle_is_reported() {
    let tmp = TempDir::new().unwrap();
    reactor(
        tmp.path(),
        &[("a", &["com.acme:b:1.0"]), ("b", &["com.acme:a:1.0"])],
    );

    kreactor_cmd(tmp.path())
        .args(["order"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cyclic dependency"));
}
