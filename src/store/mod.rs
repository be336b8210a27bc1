//! Triple Store Gateway.
//!
//! The pipeline writes fetched triples into a store and reads them back with
//! SPARQL SELECT queries. Two backends share the [`TripleStore`] interface:
//!
//! - [`RemoteStore`]: a GraphDB/RDF4J repository over HTTP
//! - [`MemoryStore`]: an embedded oxigraph store
//!
//! Inserts are best effort: [`TripleStore::insert`] logs and swallows failures,
//! so a read after a failed write simply sees stale data.

pub mod memory;
pub mod remote;

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::rdf::{self, TripleSet};

pub use memory::MemoryStore;
pub use remote::RemoteStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One row of a SELECT result: variable name to value.
///
/// IRIs are stored as their full IRI string, literals as their lexical form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution(BTreeMap<String, String>);

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(var, value);
        self
    }

    pub fn insert(&mut self, var: impl Into<String>, value: impl Into<String>) {
        self.0.insert(var.into(), value.into());
    }

    pub fn get(&self, var: &str) -> Option<&str> {
        self.0.get(var).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// SPARQL update that bulk-inserts `triples` into the default graph.
///
/// The body is N-Triples, which is valid inside `INSERT DATA` without any
/// prefix declarations.
pub fn insert_data_update(triples: &TripleSet) -> StoreResult<String> {
    let body = rdf::to_ntriples(triples)?;
    Ok(format!("INSERT DATA {{\n{body}}}"))
}

/// A store that accepts bulk inserts and answers SELECT queries.
pub trait TripleStore {
    /// Insert all triples in one write.
    ///
    /// Re-inserting a stored triple is a no-op at the data level; that is the
    /// store's set semantics, not something the caller arranges.
    fn try_insert(&self, triples: &TripleSet) -> StoreResult<()>;

    /// Run a SELECT query and return rows in result order.
    fn select(&self, query: &str) -> StoreResult<Vec<Solution>>;

    /// Best-effort insert: failures are logged, never returned.
    fn insert(&self, triples: &TripleSet) -> bool {
        match self.try_insert(triples) {
            Ok(()) => {
                tracing::info!(count = triples.len(), "inserted triples");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "triple insert failed, reads may be stale");
                false
            }
        }
    }
}

impl<T: TripleStore + ?Sized> TripleStore for Box<T> {
    fn try_insert(&self, triples: &TripleSet) -> StoreResult<()> {
        (**self).try_insert(triples)
    }

    fn select(&self, query: &str) -> StoreResult<Vec<Solution>> {
        (**self).select(query)
    }
}
