//! Pipeline facade: detected concepts in, pruned graph and description out.
//!
//! The `Pipeline` owns the relation fetcher and the triple store and runs the
//! stages in order: fetch relations, insert them, extract the pruned graph,
//! describe it. Every I/O failure is absorbed by the stage that hit it, so a
//! run always ends in a [`PipelineOutcome`].

use std::path::Path;

use crate::concept::{ConceptSet, Detector};
use crate::config::{PipelineConfig, StoreBackend};
use crate::describe::{self, DescribeResult};
use crate::error::KgResult;
use crate::extract::GraphExtractor;
use crate::fetch::{ConceptNetClient, RelationFetcher, RelationSource};
use crate::graph::KnowledgeGraph;
use crate::rdf::TripleSet;
use crate::store::{MemoryStore, RemoteStore, TripleStore};

/// What an ingest step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Concepts relations were requested for.
    pub concepts: usize,
    /// Distinct triples fetched.
    pub triples: usize,
    /// Whether the store accepted the insert.
    pub stored: bool,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub concepts: ConceptSet,
    pub ingest: IngestSummary,
    /// Pruned graph. Empty when the store could not be queried.
    pub graph: KnowledgeGraph,
    /// Turtle description of `graph`, if it could be rendered.
    pub description: Option<String>,
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// Detection found nothing; there is nothing to process.
    NothingDetected,
    Graph(PipelineReport),
}

impl PipelineOutcome {
    pub fn report(&self) -> Option<&PipelineReport> {
        match self {
            PipelineOutcome::Graph(report) => Some(report),
            PipelineOutcome::NothingDetected => None,
        }
    }
}

impl std::fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "concept-kg run")?;
        writeln!(f, "  concepts:     {}", self.concepts.len())?;
        writeln!(f, "  triples:      {}", self.ingest.triples)?;
        writeln!(f, "  stored:       {}", self.ingest.stored)?;
        writeln!(f, "  graph nodes:  {}", self.graph.node_count())?;
        writeln!(f, "  graph edges:  {}", self.graph.edge_count())?;
        Ok(())
    }
}

/// The concept-to-knowledge-graph pipeline.
pub struct Pipeline<R = Box<dyn RelationSource>, S = Box<dyn TripleStore>> {
    config: PipelineConfig,
    fetcher: RelationFetcher<R>,
    store: S,
}

impl Pipeline {
    /// Build the ConceptNet client and the configured store backend.
    pub fn new(config: PipelineConfig) -> KgResult<Self> {
        config.validate()?;
        tracing::info!(
            api = %config.api_base,
            store = ?config.store,
            endpoint = %config.query_endpoint(),
            "initializing pipeline"
        );

        let source: Box<dyn RelationSource> = Box::new(ConceptNetClient::from_config(&config));
        let store: Box<dyn TripleStore> = match config.store {
            StoreBackend::Remote => Box::new(RemoteStore::new(&config)),
            StoreBackend::Memory => Box::new(MemoryStore::new()?),
        };
        Ok(Self::with_parts(config, source, store))
    }
}

impl<R: RelationSource, S: TripleStore> Pipeline<R, S> {
    /// Assemble a pipeline from explicit collaborators.
    pub fn with_parts(config: PipelineConfig, source: R, store: S) -> Self {
        let fetcher = RelationFetcher::new(source, config.page_size, config.ingest_base.clone());
        Self {
            config,
            fetcher,
            store,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn source(&self) -> &R {
        self.fetcher.source()
    }

    /// Fetch relations for `concepts` without touching the store.
    pub fn fetch_relations(&self, concepts: &ConceptSet) -> TripleSet {
        self.fetcher.fetch_relations(concepts)
    }

    /// Fetch relations and insert them. Insert failures are logged, not returned.
    pub fn ingest(&self, concepts: &ConceptSet) -> IngestSummary {
        let triples = self.fetch_relations(concepts);
        let stored = self.store.insert(&triples);
        IngestSummary {
            concepts: concepts.len(),
            triples: triples.len(),
            stored,
        }
    }

    /// The pruned graph for `concepts` as currently stored.
    pub fn extract(&self, concepts: &ConceptSet) -> KnowledgeGraph {
        GraphExtractor::new(&self.store, self.config.concept_base.clone(), self.config.result_limit)
            .extract(concepts)
    }

    /// Turtle description of `graph` under the configured display authority.
    pub fn describe(&self, graph: &KnowledgeGraph) -> DescribeResult<String> {
        describe::describe(graph, &self.config.description_base)
    }

    /// Extract and describe in one step.
    pub fn describe_concepts(&self, concepts: &ConceptSet) -> DescribeResult<String> {
        self.describe(&self.extract(concepts))
    }

    /// Ingest, extract and describe.
    pub fn run(&self, concepts: &ConceptSet) -> PipelineOutcome {
        if concepts.is_empty() {
            tracing::warn!("no concepts to process");
            return PipelineOutcome::NothingDetected;
        }

        let ingest = self.ingest(concepts);
        let graph = self.extract(concepts);
        let description = match self.describe(&graph) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!(error = %e, "could not render description");
                None
            }
        };

        PipelineOutcome::Graph(PipelineReport {
            concepts: concepts.clone(),
            ingest,
            graph,
            description,
        })
    }

    /// Detect concepts in `image`, then [`run`](Self::run).
    pub fn run_detector(&self, detector: &dyn Detector, image: &Path) -> PipelineOutcome {
        tracing::info!(image = %image.display(), "starting object detection");
        let concepts = detector.detect(image);
        self.run(&concepts)
    }
}

impl<R, S> std::fmt::Debug for Pipeline<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish()
    }
}
