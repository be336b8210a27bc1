//! Undirected labeled graph backed by petgraph.
//!
//! Nodes are short names (URI local names), edges carry a single predicate
//! label. A `HashMap` gives O(1) node lookup by name.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Undirected knowledge graph with one label per node pair.
///
/// Adding an edge between a pair that is already connected replaces the label
/// (last write wins). Parallel predicates between the same two nodes are
/// therefore collapsed into whichever arrived last.
#[derive(Clone, Default)]
pub struct KnowledgeGraph {
    graph: UnGraph<String, String>,
    node_index: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    /// Create a new empty knowledge graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn from_graph(graph: UnGraph<String, String>) -> Self {
        let node_index = graph
            .node_indices()
            .map(|idx| (graph[idx].clone(), idx))
            .collect();
        Self { graph, node_index }
    }

    /// Ensure a node exists for the given name, returning its NodeIndex.
    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_index.insert(name.to_string(), idx);
        idx
    }

    /// Connect `a` and `b` with `label`, creating nodes as needed.
    pub fn add_edge(&mut self, a: &str, b: &str, label: &str) {
        let a = self.ensure_node(a);
        let b = self.ensure_node(b);
        self.graph.update_edge(a, b, label.to_string());
    }

    /// Check if a node exists.
    pub fn has_node(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node names in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// `(u, v, label)` for every edge, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
                e.weight().as_str(),
            )
        })
    }

    /// Label of the edge between `a` and `b`, in either direction.
    pub fn edge_label(&self, a: &str, b: &str) -> Option<&str> {
        let a = *self.node_index.get(a)?;
        let b = *self.node_index.get(b)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).map(String::as_str)
    }

    /// Distinct neighbors of `name`.
    pub fn neighbors(&self, name: &str) -> BTreeSet<&str> {
        match self.node_index.get(name) {
            Some(&idx) => self
                .graph
                .neighbors(idx)
                .map(|n| self.graph[n].as_str())
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// A copy keeping only nodes for which `keep` holds, along with the edges between them.
    pub fn retain_nodes(&self, keep: impl Fn(&str) -> bool) -> Self {
        let graph = self.graph.filter_map(
            |_, name| keep(name).then(|| name.clone()),
            |_, label| Some(label.clone()),
        );
        Self::from_graph(graph)
    }
}

impl std::fmt::Debug for KnowledgeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}
