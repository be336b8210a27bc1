//! Embedded triple store backed by oxigraph.
//!
//! Runs the same `INSERT DATA` update and SELECT queries the remote store
//! receives, without a server. Contents live as long as the value.

use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::error::StoreError;
use crate::rdf::TripleSet;

use super::{insert_data_update, Solution, StoreResult, TripleStore};

const ENDPOINT: &str = "memory";

/// In-process SPARQL store.
pub struct MemoryStore {
    store: Store,
}

impl MemoryStore {
    pub fn new() -> StoreResult<Self> {
        let store = Store::new().map_err(|e| StoreError::Open {
            message: e.to_string(),
        })?;
        Ok(Self { store })
    }

    /// Number of stored triples.
    pub fn len(&self) -> StoreResult<usize> {
        self.store.len().map_err(|e| StoreError::QueryFailed {
            endpoint: ENDPOINT.into(),
            message: e.to_string(),
        })
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|n| n == 0)
    }
}

/// IRI string for named nodes, lexical form for literals.
fn term_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::BlankNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

impl TripleStore for MemoryStore {
    fn try_insert(&self, triples: &TripleSet) -> StoreResult<()> {
        if triples.is_empty() {
            return Ok(());
        }
        let update = insert_data_update(triples)?;
        self.store
            .update(update.as_str())
            .map_err(|e| StoreError::InsertFailed {
                endpoint: ENDPOINT.into(),
                message: e.to_string(),
            })
    }

    fn select(&self, query: &str) -> StoreResult<Vec<Solution>> {
        let query_failed = |message: String| StoreError::QueryFailed {
            endpoint: ENDPOINT.into(),
            message,
        };
        let results = self
            .store
            .query(query)
            .map_err(|e| query_failed(e.to_string()))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| query_failed(e.to_string()))?;
                    let mut row = Solution::new();
                    for (var, term) in solution.iter() {
                        row.insert(var.as_str(), term_value(term));
                    }
                    rows.push(row);
                }
                Ok(rows)
            }
            _ => Err(query_failed("expected a SELECT query".into())),
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish()
    }
}
