//! Knowledge graph: the display-ready view of stored relations.
//!
//! - [`KnowledgeGraph`] (`index`): undirected petgraph graph keyed by local names,
//!   one predicate label per node pair
//! - Pruning (`prune`): single-pass removal of nodes that hang off exactly one concept

pub mod index;
pub mod prune;

pub use index::KnowledgeGraph;
pub use prune::prune_targets;
