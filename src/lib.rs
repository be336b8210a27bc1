// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # concept-kg
//!
//! Turns detected object labels into a pruned semantic knowledge graph using
//! ConceptNet relations persisted in a SPARQL triple store.
//!
//! ## Architecture
//!
//! - **Relation fetcher** (`fetch`): paginated ConceptNet client, edges normalized to RDF triples
//! - **Triple store gateway** (`store`): bulk `INSERT DATA` and SELECT over a remote
//!   GraphDB/RDF4J repository or an embedded oxigraph store
//! - **Graph extractor** (`extract`): relevance query, petgraph materialization, pruning
//! - **Description serializer** (`describe`): Turtle rendering of the pruned graph
//! - **Pipeline** (`pipeline`): wires the stages together with an explicit config
//!
//! ## Library usage
//!
//! ```no_run
//! use concept_kg::concept::ConceptSet;
//! use concept_kg::config::{PipelineConfig, StoreBackend};
//! use concept_kg::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::new(PipelineConfig {
//!     store: StoreBackend::Memory,
//!     ..Default::default()
//! })
//! .unwrap();
//! let concepts: ConceptSet = ["dog", "leash"].into_iter().collect();
//! if let Some(report) = pipeline.run(&concepts).report() {
//!     println!("{}", report.description.as_deref().unwrap_or_default());
//! }
//! ```

pub mod concept;
pub mod config;
pub mod describe;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod graph;
pub mod pipeline;
pub mod rdf;
pub mod store;
