//! Module-to-module dependency graph of a reactor.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use kreactor_core::artifact::Scope;
use kreactor_core::module::Module;
use kreactor_util::errors::{KreactorError, KreactorResult};

use crate::classify::ModuleDependencyData;

/// Reactor modules as nodes, direct reactor dependencies as edges pointing
/// from the dependent module to its dependency.
pub struct ReactorGraph {
    graph: DiGraph<String, Scope>,
    index: HashMap<String, NodeIndex>,
}

impl ReactorGraph {
    /// Build from modules in reactor order and their classified dependencies,
    /// keyed by module FullId.
    pub fn build(modules: &[Module], data: &BTreeMap<String, ModuleDependencyData>) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for module in modules {
            let id = module.id();
            let idx = graph.add_node(id.clone());
            index.insert(id, idx);
        }
        for module in modules {
            let from = index[&module.id()];
            let Some(deps) = data.get(&module.id()) else {
                continue;
            };
            for dep in deps.reactor() {
                let Some(&to) = index.get(&dep.full_id()) else {
                    continue;
                };
                if !graph.edges(from).any(|e| e.target() == to) {
                    graph.add_edge(from, to, dep.effective_scope());
                }
            }
        }
        Self { graph, index }
    }

    /// Direct reactor dependencies of a module, in declaration order.
    pub fn dependencies_of(&self, id: &str) -> Vec<(&str, Scope)> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| (self.graph[e.target()].as_str(), *e.weight()))
            .collect()
    }

    /// Modules that directly depend on `id`.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut sources: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .collect();
        sources.sort();
        sources
            .into_iter()
            .map(|s| self.graph[s].as_str())
            .collect()
    }

    /// The first cycle among reactor modules, closed by repeating its start.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let cyclic = petgraph::algo::tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .min_by_key(|scc| scc.iter().min().copied())?;
        let start = *cyclic.iter().min()?;
        let members: HashSet<NodeIndex> = cyclic.into_iter().collect();

        let mut path = vec![start];
        let mut visited = HashSet::new();
        self.walk_cycle(start, start, &members, &mut path, &mut visited)
            .then(|| path.iter().map(|&idx| self.graph[idx].clone()).collect())
    }

    fn walk_cycle(
        &self,
        current: NodeIndex,
        start: NodeIndex,
        members: &HashSet<NodeIndex>,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        let mut targets: Vec<NodeIndex> = self.graph.neighbors(current).collect();
        targets.sort();
        for next in targets {
            if next == start {
                path.push(start);
                return true;
            }
            if members.contains(&next) && visited.insert(next) {
                path.push(next);
                if self.walk_cycle(next, start, members, path, visited) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }

    /// Fail with [`KreactorError::CyclicDependency`] if modules form a loop.
    pub fn check_acyclic(&self) -> KreactorResult<()> {
        match self.find_cycle() {
            Some(cycle) => Err(KreactorError::CyclicDependency { cycle }),
            None => Ok(()),
        }
    }

    /// Module FullIds ordered so that every module comes after its reactor
    /// dependencies. Ties keep reactor order.
    pub fn build_order(&self) -> KreactorResult<Vec<String>> {
        let mut pending: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| (idx, self.graph.neighbors(idx).count()))
            .collect();
        let mut ready: BTreeSet<NodeIndex> = pending
            .iter()
            .filter(|(_, &n)| n == 0)
            .map(|(&idx, _)| idx)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(idx) = ready.pop_first() {
            order.push(self.graph[idx].clone());
            for dependent in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if let Some(n) = pending.get_mut(&dependent) {
                    *n -= 1;
                    if *n == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if order.len() < self.graph.node_count() {
            self.check_acyclic()?;
        }
        Ok(order)
    }

    /// Print the reactor dependency tree below `id`.
    pub fn print_tree(&self, id: &str, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let Some(&root) = self.index.get(id) else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[root]));

        let mut visited = HashSet::new();
        visited.insert(root);
        let deps = self.dependencies_of(id);
        let count = deps.len();
        for (i, (child, scope)) in deps.into_iter().enumerate() {
            self.print_subtree(
                &mut output,
                child,
                scope,
                "",
                i == count - 1,
                1,
                max_depth,
                &mut visited,
            );
        }
        output
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        id: &str,
        scope: Scope,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{id} ({scope})\n"));

        if max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        let Some(&idx) = self.index.get(id) else {
            return;
        };
        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(id);
        let count = deps.len();
        for (i, (child, child_scope)) in deps.into_iter().enumerate() {
            self.print_subtree(
                output,
                child,
                child_scope,
                &child_prefix,
                i == count - 1,
                depth + 1,
                max_depth,
                visited,
            );
        }
        visited.remove(&idx);
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
