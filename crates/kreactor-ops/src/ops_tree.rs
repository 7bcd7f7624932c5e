//! Operation: display the reactor module tree and version conflicts.

use kreactor_resolver::graph::ReactorGraph;
use kreactor_util::errors::KreactorError;

use crate::Session;

/// Options for `kreactor tree`.
#[derive(Debug, Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Only show the tree below this module (FullId or artifactId).
    pub module: Option<String>,
    /// Show modules that depend on the selected module instead.
    pub inverted: bool,
    /// Resolve the reactor and print version conflicts.
    pub conflicts: bool,
}

/// Display the module tree for the reactor.
pub fn tree(session: &Session, opts: &TreeOptions) -> miette::Result<()> {
    if opts.conflicts {
        let resolution = session.resolve()?;
        if resolution.conflicts.is_empty() {
            println!("No version conflicts.");
        } else {
            print!("{}", resolution.conflicts);
        }
        return Ok(());
    }
    let graph = session.graph()?;
    print!("{}", render(session, &graph, opts)?);
    Ok(())
}

pub fn render(session: &Session, graph: &ReactorGraph, opts: &TreeOptions) -> miette::Result<String> {
    let roots: Vec<String> = match &opts.module {
        Some(wanted) => {
            let module = session
                .reactor
                .find(wanted)
                .or_else(|| session.reactor.find_by_artifact_id(wanted))
                .ok_or_else(|| KreactorError::ModuleNotFound {
                    coordinate: wanted.clone(),
                })?;
            vec![module.id()]
        }
        None => session.reactor.modules.iter().map(|m| m.id()).collect(),
    };

    let mut out = String::new();
    for id in &roots {
        if opts.inverted {
            out.push_str(&format!("{id}\n"));
            let dependents = graph.dependents_of(id);
            if dependents.is_empty() {
                out.push_str("    (no dependents in reactor)\n");
            }
            for dependent in dependents {
                out.push_str(&format!("    <- {dependent}\n"));
            }
        } else {
            out.push_str(&graph.print_tree(id, opts.depth));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn open(root: &std::path::Path) -> Session {
        fixtures::reactor(root);
        Session::open(root, &fixtures::overrides(&root.join("repo"))).unwrap()
    }

    #[test]
    fn tree_of_one_module() {
        let tmp = tempfile::tempdir().unwrap();
        let session = open(tmp.path());
        let graph = session.graph().unwrap();
        let opts = TreeOptions {
            module: Some("web".to_string()),
            ..Default::default()
        };
        let out = render(&session, &graph, &opts).unwrap();
        assert_eq!(
            out,
            "com.acme:web:jar:1.0\n└── com.acme:core:jar:1.0 (compile)\n"
        );
    }

    #[test]
    fn inverted_lists_dependents() {
        let tmp = tempfile::tempdir().unwrap();
        let session = open(tmp.path());
        let graph = session.graph().unwrap();
        let opts = TreeOptions {
            module: Some("com.acme:core:jar:1.0".to_string()),
            inverted: true,
            ..Default::default()
        };
        let out = render(&session, &graph, &opts).unwrap();
        assert_eq!(out, "com.acme:core:jar:1.0\n    <- com.acme:web:jar:1.0\n");
    }

    #[test]
    fn unknown_module() {
        let tmp = tempfile::tempdir().unwrap();
        let session = open(tmp.path());
        let graph = session.graph().unwrap();
        let opts = TreeOptions {
            module: Some("missing".to_string()),
            ..Default::default()
        };
        assert!(render(&session, &graph, &opts).is_err());
    }
}
