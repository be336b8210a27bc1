//! Relevance pruning.
//!
//! A node that is not itself a concept and touches exactly one concept adds no
//! connection between detected objects, so it is dropped. Decisions are taken
//! on the unpruned adjacency in a single pass; removing a node never causes a
//! second node to be re-examined. Nodes with no concept-neighbor at all are
//! kept.

use std::collections::HashSet;

use crate::concept::ConceptSet;

use super::index::KnowledgeGraph;

/// Names of the nodes the pruning rule removes, in node order.
pub fn prune_targets(graph: &KnowledgeGraph, concepts: &ConceptSet) -> Vec<String> {
    graph
        .nodes()
        .filter(|node| !concepts.contains(node))
        .filter(|node| {
            graph
                .neighbors(node)
                .into_iter()
                .filter(|n| concepts.contains(n))
                .count()
                == 1
        })
        .map(str::to_string)
        .collect()
}

impl KnowledgeGraph {
    /// The graph with every [`prune_targets`] node and its edges removed.
    pub fn prune(&self, concepts: &ConceptSet) -> KnowledgeGraph {
        let targets: HashSet<String> = prune_targets(self, concepts).into_iter().collect();
        if targets.is_empty() {
            return self.clone();
        }
        tracing::debug!(removed = targets.len(), "pruning single-concept nodes");
        self.retain_nodes(|node| !targets.contains(node))
    }
}
