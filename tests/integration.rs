//! End-to-end tests for the concept-kg pipeline.
//!
//! These tests drive the full pipeline from concepts through fetching,
//! insertion, relevance extraction, pruning and description, with a scripted
//! relation API and the embedded store.

use std::cell::RefCell;
use std::collections::HashMap;

use oxigraph::io::{RdfFormat, RdfParser};

use concept_kg::concept::{ConceptSet, LabelFileDetector};
use concept_kg::config::PipelineConfig;
use concept_kg::describe::description_triples;
use concept_kg::error::FetchError;
use concept_kg::fetch::{Edge, EdgePage, FetchResult, RelationSource};
use concept_kg::pipeline::{Pipeline, PipelineOutcome};
use concept_kg::rdf::{Triple, TripleSet};
use concept_kg::store::MemoryStore;

/// Relation API stand-in: canned pages per concept, every call recorded.
#[derive(Default)]
struct MockApi {
    pages: HashMap<String, Vec<EdgePage>>,
    calls: RefCell<Vec<(String, usize, usize)>>,
}

impl MockApi {
    fn page(mut self, concept: &str, edges: &[(&str, &str, &str)]) -> Self {
        let page = EdgePage {
            edges: edges
                .iter()
                .map(|(s, r, e)| Edge::new(s, r, e))
                .collect(),
        };
        self.pages.entry(concept.to_string()).or_default().push(page);
        self
    }

    fn calls_for(&self, concept: &str) -> usize {
        self.calls.borrow().iter().filter(|(c, _, _)| c == concept).count()
    }
}

impl RelationSource for MockApi {
    fn fetch_page(&self, concept: &str, limit: usize, offset: usize) -> FetchResult<EdgePage> {
        let index = self.calls_for(concept);
        self.calls.borrow_mut().push((concept.to_string(), limit, offset));
        self.pages
            .get(concept)
            .and_then(|pages| pages.get(index))
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: format!("mock:///c/en/{concept}"),
                status: 404,
            })
    }
}

fn dog_and_leash_api() -> MockApi {
    MockApi::default()
        .page(
            "dog",
            &[
                ("/c/en/dog", "/r/RelatedTo", "/c/en/walk"),
                ("/c/en/dog", "/r/IsA", "/c/en/pet"),
                ("/c/en/canine_tooth", "/r/PartOf", "/c/en/mouth"),
            ],
        )
        .page(
            "leash",
            &[
                ("/c/en/leash", "/r/UsedFor", "/c/en/walk"),
                ("/c/en/leash", "/r/AtLocation", "/c/en/pet_store"),
            ],
        )
}

fn concepts(names: &[&str]) -> ConceptSet {
    names.iter().collect()
}

fn pipeline(api: MockApi) -> Pipeline<MockApi, MemoryStore> {
    Pipeline::with_parts(PipelineConfig::default(), api, MemoryStore::new().unwrap())
}

#[test]
fn dog_and_leash_scenario() {
    let pipeline = pipeline(dog_and_leash_api());
    let concepts = concepts(&["dog", "leash"]);

    let summary = pipeline.ingest(&concepts);

    // Both pages are shorter than the page size: one request per concept.
    assert_eq!(pipeline.source().calls_for("dog"), 1);
    assert_eq!(pipeline.source().calls_for("leash"), 1);
    assert_eq!(summary.triples, 5);
    assert!(summary.stored);
    assert_eq!(pipeline.store().len().unwrap(), 5);

    let graph = pipeline.extract(&concepts);

    // walk bridges dog and leash.
    assert!(graph.has_node("walk"));
    assert_eq!(graph.edge_label("dog", "walk"), Some("RelatedTo"));
    assert_eq!(graph.edge_label("leash", "walk"), Some("UsedFor"));
    // pet and pet_store each hang off a single concept.
    assert!(!graph.has_node("pet"));
    assert!(!graph.has_node("pet_store"));
    // canine_tooth/mouth never matched the relevance query.
    assert!(!graph.has_node("mouth"));

    assert!(graph.has_node("dog"));
    assert!(graph.has_node("leash"));
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn run_produces_parseable_description() {
    let pipeline = pipeline(dog_and_leash_api());
    let outcome = pipeline.run(&concepts(&["dog", "leash"]));
    let report = outcome.report().expect("concepts were given");

    let turtle = report.description.as_deref().unwrap();
    let parsed: TripleSet = RdfParser::from_format(RdfFormat::Turtle)
        .for_reader(turtle.as_bytes())
        .map(|quad| {
            let quad = quad.unwrap();
            let iri = |s: String| s.trim_matches(|c| c == '<' || c == '>').to_string();
            Triple::new(
                &iri(quad.subject.to_string()),
                quad.predicate.as_str(),
                &iri(quad.object.to_string()),
            )
            .unwrap()
        })
        .collect();

    let expected = description_triples(&report.graph, "http://example.org/").unwrap();
    assert_eq!(parsed, expected);
    assert!(parsed.contains(
        &Triple::new(
            "http://example.org/dog",
            "http://example.org/RelatedTo",
            "http://example.org/walk"
        )
        .unwrap()
    ));
}

#[test]
fn pagination_stops_after_nth_call() {
    let config = PipelineConfig {
        page_size: 2,
        ..Default::default()
    };
    let api = MockApi::default()
        .page("dog", &[("/c/en/dog", "/r/IsA", "/c/en/pet"), ("/c/en/dog", "/r/IsA", "/c/en/animal")])
        .page("dog", &[("/c/en/dog", "/r/IsA", "/c/en/mammal"), ("/c/en/dog", "/r/HasA", "/c/en/tail")])
        .page("dog", &[("/c/en/dog", "/r/CapableOf", "/c/en/bark")]);
    let pipeline = Pipeline::with_parts(config, api, MemoryStore::new().unwrap());

    let triples = pipeline.fetch_relations(&concepts(&["dog"]));

    assert_eq!(pipeline.source().calls_for("dog"), 3);
    let offsets: Vec<usize> = pipeline
        .source()
        .calls
        .borrow()
        .iter()
        .map(|(_, _, offset)| *offset)
        .collect();
    assert_eq!(offsets, vec![0, 2, 4]);
    assert_eq!(triples.len(), 5);
}

#[test]
fn failing_concept_does_not_stop_the_others() {
    // "bench" has no scripted pages, so its first request fails.
    let pipeline = pipeline(dog_and_leash_api());
    let summary = pipeline.ingest(&concepts(&["bench", "dog", "leash"]));

    assert_eq!(summary.triples, 5);
    assert_eq!(pipeline.source().calls_for("bench"), 1);
}

#[test]
fn nothing_detected_is_a_terminal_state() {
    let tmp = tempfile::TempDir::new().unwrap();
    let image = tmp.path().join("empty.jpg");
    std::fs::write(tmp.path().join("empty.jpg.labels"), "# no detections\n").unwrap();

    let pipeline = pipeline(dog_and_leash_api());
    let outcome = pipeline.run_detector(&LabelFileDetector::sidecar(), &image);

    assert!(matches!(outcome, PipelineOutcome::NothingDetected));
    assert!(pipeline.source().calls.borrow().is_empty());
}

#[test]
fn detector_labels_feed_the_pipeline() {
    let tmp = tempfile::TempDir::new().unwrap();
    let image = tmp.path().join("park.jpg");
    std::fs::write(tmp.path().join("park.jpg.labels"), "dog\nleash\ndog\n").unwrap();

    let pipeline = pipeline(dog_and_leash_api());
    let outcome = pipeline.run_detector(&LabelFileDetector::sidecar(), &image);
    let report = outcome.report().unwrap();

    assert_eq!(report.concepts.len(), 2);
    assert!(report.graph.has_node("walk"));
}
