//! RDF triples built from raw ConceptNet ids.
//!
//! A [`Triple`] holds three IRIs. Each IRI is formed by appending a raw id
//! (e.g. `/c/en/dog`) to a fixed base authority (e.g. `http://conceptnet.io`)
//! and validated with oxigraph before the triple exists.

use std::collections::BTreeSet;

use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::{NamedNode, NamedNodeRef, TripleRef};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A (subject, predicate, object) statement whose positions are all IRIs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    subject: String,
    predicate: String,
    object: String,
}

/// Set of triples. Duplicates collapse, iteration order is lexicographic.
pub type TripleSet = BTreeSet<Triple>;

impl Triple {
    /// Build a triple from three full IRIs. Returns `None` if any is not a valid IRI.
    pub fn new(subject: &str, predicate: &str, object: &str) -> Option<Self> {
        Some(Self {
            subject: NamedNode::new(subject).ok()?.into_string(),
            predicate: NamedNode::new(predicate).ok()?.into_string(),
            object: NamedNode::new(object).ok()?.into_string(),
        })
    }

    /// Build a triple by namespacing three raw ids under `base`.
    pub fn namespaced(base: &str, start: &str, rel: &str, end: &str) -> Option<Self> {
        Self::new(
            &namespace(base, start),
            &namespace(base, rel),
            &namespace(base, end),
        )
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    fn as_oxigraph(&self) -> TripleRef<'_> {
        // Validated in `Triple::new`.
        TripleRef::new(
            NamedNodeRef::new_unchecked(&self.subject),
            NamedNodeRef::new_unchecked(&self.predicate),
            NamedNodeRef::new_unchecked(&self.object),
        )
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> <{}> <{}> .", self.subject, self.predicate, self.object)
    }
}

/// Append a raw id to a base authority. No escaping is applied.
pub fn namespace(base: &str, id: &str) -> String {
    format!("{base}{id}")
}

/// The trailing path segment of an IRI: `http://conceptnet.io/c/en/dog` -> `dog`.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit('/').next().unwrap_or(iri)
}

/// Serialize a triple set as N-Triples, one statement per line.
pub fn to_ntriples(triples: &TripleSet) -> Result<String, StoreError> {
    let mut serializer = RdfSerializer::from_format(RdfFormat::NTriples).for_writer(Vec::new());
    for triple in triples {
        serializer
            .serialize_triple(triple.as_oxigraph())
            .map_err(|e| StoreError::Serialize {
                message: e.to_string(),
            })?;
    }
    let bytes = serializer.finish().map_err(|e| StoreError::Serialize {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| StoreError::Serialize {
        message: e.to_string(),
    })
}
