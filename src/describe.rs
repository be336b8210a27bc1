//! Description Serializer: a graph as a Turtle document.
//!
//! Each edge `(u, v, label)` becomes `<base/u> <base/label> <base/v>`. The base
//! is a display authority (`http://example.org/` by default), distinct from the
//! ConceptNet authority used for ingestion.

use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::{NamedNode, TripleRef};

use crate::error::DescribeError;
use crate::graph::KnowledgeGraph;
use crate::rdf::{namespace, Triple, TripleSet};

/// Result type for description rendering.
pub type DescribeResult<T> = std::result::Result<T, DescribeError>;

const PREFIX: &str = "ex";

fn iri(base: &str, name: &str) -> DescribeResult<NamedNode> {
    NamedNode::new(namespace(base, name)).map_err(|_| DescribeError::InvalidIri {
        base: base.to_string(),
        value: name.to_string(),
    })
}

/// The triples a description of `graph` contains.
pub fn description_triples(graph: &KnowledgeGraph, base: &str) -> DescribeResult<TripleSet> {
    graph
        .edges()
        .map(|(u, v, label)| {
            Triple::new(&namespace(base, u), &namespace(base, label), &namespace(base, v))
                .ok_or_else(|| DescribeError::InvalidIri {
                    base: base.to_string(),
                    value: format!("{u} {label} {v}"),
                })
        })
        .collect()
}

/// Render `graph` as Turtle under `base`.
///
/// Output follows the graph's edge order. Two graphs with the same edges in a
/// different order produce the same triples in a different order.
pub fn describe(graph: &KnowledgeGraph, base: &str) -> DescribeResult<String> {
    let serialize_err = |e: std::io::Error| DescribeError::Serialize {
        message: e.to_string(),
    };
    let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle)
        .with_prefix(PREFIX, base)
        .map_err(|_| DescribeError::InvalidIri {
            base: base.to_string(),
            value: String::new(),
        })?
        .for_writer(Vec::new());

    for (u, v, label) in graph.edges() {
        let (s, p, o) = (iri(base, u)?, iri(base, label)?, iri(base, v)?);
        serializer
            .serialize_triple(TripleRef::new(s.as_ref(), p.as_ref(), o.as_ref()))
            .map_err(serialize_err)?;
    }

    let bytes = serializer.finish().map_err(serialize_err)?;
    String::from_utf8(bytes).map_err(|e| DescribeError::Serialize {
        message: e.to_string(),
    })
}
