//! Export types for serializing a pruned graph.
//!
//! These types give display consumers a flat, JSON-friendly view of the
//! graph: node names flagged by whether they are detected concepts, and
//! labeled edges.

use serde::{Deserialize, Serialize};

use crate::concept::ConceptSet;
use crate::graph::KnowledgeGraph;

/// Exported node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExport {
    /// Local name.
    pub id: String,
    /// Whether the node is one of the detected concepts.
    pub concept: bool,
}

/// Exported edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeExport {
    pub source: String,
    pub target: String,
    /// Predicate local name, e.g. `RelatedTo`.
    pub label: String,
}

/// Exported graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
}

impl GraphExport {
    pub fn new(graph: &KnowledgeGraph, concepts: &ConceptSet) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|id| NodeExport {
                    id: id.to_string(),
                    concept: concepts.contains(id),
                })
                .collect(),
            edges: graph
                .edges()
                .map(|(source, target, label)| EdgeExport {
                    source: source.to_string(),
                    target: target.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        }
    }
}
