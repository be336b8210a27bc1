//! Graph Extractor: relevance query, materialization, pruning.
//!
//! The extractor asks the store for every triple that touches a concept, plus
//! triples one hop away, builds an undirected graph from the rows, and prunes
//! it. A failed query yields an empty graph.

use oxigraph::model::NamedNode;

use crate::concept::ConceptSet;
use crate::graph::KnowledgeGraph;
use crate::rdf::local_name;
use crate::store::{Solution, TripleStore};

/// Concept IRIs under `concept_base`. Labels that do not form a valid IRI
/// (e.g. `cell phone`) are left out with a warning.
pub fn concept_iris(concepts: &ConceptSet, concept_base: &str) -> Vec<String> {
    concepts
        .iter()
        .filter_map(|c| match NamedNode::new(format!("{concept_base}{c}")) {
            Ok(node) => Some(node.into_string()),
            Err(e) => {
                tracing::warn!(concept = c, error = %e, "concept is not a valid IRI segment, skipping");
                None
            }
        })
        .collect()
}

/// Build the relevance query.
///
/// Three branches are UNION'ed:
/// 1. the subject or the object is a concept,
/// 2. the object is the subject of a triple whose object is a concept,
/// 3. the subject is the object of a triple whose subject is a concept.
///
/// Rows are capped at `limit`; dense concept sets get truncated results.
pub fn relevance_query(concepts: &ConceptSet, concept_base: &str, limit: usize) -> String {
    query_for_iris(&concept_iris(concepts, concept_base), limit)
}

fn query_for_iris(iris: &[String], limit: usize) -> String {
    let iris = iris
        .iter()
        .map(|iri| format!("<{iri}>"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT DISTINCT ?subject ?predicate ?object
WHERE {{
    {{
        ?subject ?predicate ?object .
        FILTER (?subject IN ({iris}) || ?object IN ({iris}))
    }}
    UNION
    {{
        ?subject ?predicate ?object .
        ?object ?hopPredicate ?hop .
        FILTER (?hop IN ({iris}))
    }}
    UNION
    {{
        ?subject ?predicate ?object .
        ?hop ?hopPredicate ?subject .
        FILTER (?hop IN ({iris}))
    }}
}}
LIMIT {limit}"
    )
}

/// Build a graph from `subject`/`predicate`/`object` rows using local names.
///
/// Rows missing any of the three variables are skipped.
pub fn materialize(rows: &[Solution]) -> KnowledgeGraph {
    let mut graph = KnowledgeGraph::new();
    for row in rows {
        let (Some(s), Some(p), Some(o)) = (row.get("subject"), row.get("predicate"), row.get("object"))
        else {
            tracing::debug!(?row, "skipping incomplete row");
            continue;
        };
        graph.add_edge(local_name(s), local_name(o), local_name(p));
    }
    graph
}

/// Extracts pruned graphs from a triple store.
pub struct GraphExtractor<'a, S: TripleStore + ?Sized> {
    store: &'a S,
    concept_base: String,
    result_limit: usize,
}

impl<'a, S: TripleStore + ?Sized> GraphExtractor<'a, S> {
    pub fn new(store: &'a S, concept_base: impl Into<String>, result_limit: usize) -> Self {
        Self {
            store,
            concept_base: concept_base.into(),
            result_limit,
        }
    }

    /// The unpruned relevance graph for `concepts`.
    pub fn relevance_graph(&self, concepts: &ConceptSet) -> KnowledgeGraph {
        let iris = concept_iris(concepts, &self.concept_base);
        if iris.is_empty() {
            return KnowledgeGraph::new();
        }
        let query = query_for_iris(&iris, self.result_limit);
        tracing::debug!("sending relevance query");

        let rows = match self.store.select(&query) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, "relevance query failed");
                return KnowledgeGraph::new();
            }
        };
        if rows.len() >= self.result_limit {
            tracing::warn!(limit = self.result_limit, "relevance query hit the row cap, graph is truncated");
        }
        tracing::info!(rows = rows.len(), "building graph from query results");
        materialize(&rows)
    }

    /// The pruned graph for `concepts`. Empty if the store cannot be queried.
    pub fn extract(&self, concepts: &ConceptSet) -> KnowledgeGraph {
        let graph = self.relevance_graph(concepts);
        let pruned = graph.prune(concepts);
        tracing::info!(
            nodes = pruned.node_count(),
            edges = pruned.edge_count(),
            removed = graph.node_count() - pruned.node_count(),
            "graph extracted"
        );
        pruned
    }
}
