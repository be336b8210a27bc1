//! Relation Fetcher: paginated retrieval of ConceptNet edges.
//!
//! [`ConceptNetClient`] speaks HTTP to the relation API and decodes typed
//! pages. [`RelationFetcher`] drives pagination per concept and normalizes
//! each edge into a [`Triple`]. Failures never escape `fetch_relations`: a
//! failed page ends that concept's pagination and the next concept starts.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::concept::ConceptSet;
use crate::config::PipelineConfig;
use crate::error::FetchError;
use crate::rdf::{Triple, TripleSet};

/// Result type for relation fetching.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// `{"@id": "/c/en/dog"}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IdRef {
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
}

/// One edge as returned by the relation API. Any position may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub rel: Option<IdRef>,
    #[serde(default)]
    pub start: Option<IdRef>,
    #[serde(default)]
    pub end: Option<IdRef>,
}

impl Edge {
    /// Build an edge from raw ids.
    pub fn new(start: &str, rel: &str, end: &str) -> Self {
        let id = |s: &str| {
            Some(IdRef {
                id: Some(s.to_string()),
            })
        };
        Self {
            rel: id(rel),
            start: id(start),
            end: id(end),
        }
    }

    /// `(start, rel, end)` when all three ids are present and non-empty.
    pub fn ids(&self) -> Option<(&str, &str, &str)> {
        fn id(r: &Option<IdRef>) -> Option<&str> {
            r.as_ref()?.id.as_deref().filter(|s| !s.is_empty())
        }
        Some((id(&self.start)?, id(&self.rel)?, id(&self.end)?))
    }

    /// Normalize into a triple under `base`. Incomplete edges yield nothing.
    pub fn to_triple(&self, base: &str) -> Option<Triple> {
        let (start, rel, end) = self.ids()?;
        Triple::namespaced(base, start, rel, end)
    }
}

/// A decoded page of the relation API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EdgePage {
    #[serde(default, deserialize_with = "lenient_edges")]
    pub edges: Vec<Edge>,
}

/// Decode edges one at a time. A malformed edge becomes an empty [`Edge`], so
/// it is skipped like an incomplete one and still counts toward the page size.
fn lenient_edges<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Edge>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "malformed edge");
                Edge::default()
            })
        })
        .collect())
}

/// A page after normalization.
#[derive(Debug, Clone, Default)]
pub struct RelationPage {
    /// Triples built from the page's complete edges.
    pub triples: Vec<Triple>,
    /// Raw edges on the page, including skipped ones.
    pub edge_count: usize,
    /// Whether another page may exist for the same concept.
    pub has_more: bool,
}

impl RelationPage {
    fn from_edges(page: &EdgePage, base: &str, limit: usize) -> Self {
        let triples: Vec<Triple> = page.edges.iter().filter_map(|e| e.to_triple(base)).collect();
        let skipped = page.edges.len() - triples.len();
        if skipped > 0 {
            tracing::debug!(skipped, "skipped incomplete edges");
        }
        Self {
            edge_count: page.edges.len(),
            has_more: page.edges.len() >= limit,
            triples,
        }
    }
}

/// Source of relation pages for a concept.
pub trait RelationSource {
    fn fetch_page(&self, concept: &str, limit: usize, offset: usize) -> FetchResult<EdgePage>;
}

impl<T: RelationSource + ?Sized> RelationSource for Box<T> {
    fn fetch_page(&self, concept: &str, limit: usize, offset: usize) -> FetchResult<EdgePage> {
        (**self).fetch_page(concept, limit, offset)
    }
}

/// HTTP client for the ConceptNet API.
pub struct ConceptNetClient {
    api_base: String,
    agent: ureq::Agent,
}

impl ConceptNetClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            api_base: api_base.into(),
            agent,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.api_base.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// `{api_base}/{concept}?limit={limit}&offset={offset}`
    pub fn page_url(&self, concept: &str, limit: usize, offset: usize) -> String {
        format!(
            "{}/{concept}?limit={limit}&offset={offset}",
            self.api_base.trim_end_matches('/')
        )
    }
}

impl RelationSource for ConceptNetClient {
    fn fetch_page(&self, concept: &str, limit: usize, offset: usize) -> FetchResult<EdgePage> {
        let url = self.page_url(concept, limit, offset);
        tracing::debug!(%url, "requesting relation page");

        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(FetchError::Status { url, status });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Transport {
                    url,
                    message: transport.to_string(),
                });
            }
        };

        response.into_json().map_err(|e| FetchError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

/// Drives pagination over a [`RelationSource`].
pub struct RelationFetcher<S> {
    source: S,
    page_size: usize,
    base: String,
}

impl<S: RelationSource> RelationFetcher<S> {
    pub fn new(source: S, page_size: usize, base: impl Into<String>) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            base: base.into(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and normalize one page.
    pub fn fetch_page(&self, concept: &str, offset: usize) -> FetchResult<RelationPage> {
        let page = self.source.fetch_page(concept, self.page_size, offset)?;
        Ok(RelationPage::from_edges(&page, &self.base, self.page_size))
    }

    /// Fetch every page for one concept into `out`. Returns the number of pages requested.
    fn fetch_concept(&self, concept: &str, out: &mut TripleSet) -> usize {
        tracing::info!(concept, "fetching relations");
        let mut offset = 0;
        let mut requests = 0;
        let mut edges = 0;
        loop {
            requests += 1;
            let page = match self.fetch_page(concept, offset) {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(concept, offset, error = %e, "relation request failed");
                    break;
                }
            };
            edges += page.edge_count;
            for triple in page.triples {
                tracing::trace!(%triple, "added relation");
                out.insert(triple);
            }
            if !page.has_more {
                tracing::info!(concept, pages = requests, edges, "fetched all relations");
                break;
            }
            offset += self.page_size;
        }
        requests
    }

    /// Fetch relations for every concept. Never fails; failed concepts contribute nothing.
    pub fn fetch_relations(&self, concepts: &ConceptSet) -> TripleSet {
        let mut triples = TripleSet::new();
        for concept in concepts.iter() {
            self.fetch_concept(concept, &mut triples);
        }
        tracing::info!(
            concepts = concepts.len(),
            triples = triples.len(),
            "finished fetching relations"
        );
        triples
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    const CN: &str = "http://conceptnet.io";

    /// Serves canned pages and records every request.
    #[derive(Default)]
    struct ScriptedSource {
        pages: HashMap<String, Vec<FetchResult<EdgePage>>>,
        calls: RefCell<Vec<(String, usize, usize)>>,
    }

    impl ScriptedSource {
        fn with_pages(mut self, concept: &str, pages: Vec<FetchResult<EdgePage>>) -> Self {
            self.pages.insert(concept.to_string(), pages);
            self
        }

        fn calls_for(&self, concept: &str) -> Vec<usize> {
            self.calls
                .borrow()
                .iter()
                .filter(|(c, _, _)| c == concept)
                .map(|(_, _, offset)| *offset)
                .collect()
        }
    }

    impl RelationSource for ScriptedSource {
        fn fetch_page(&self, concept: &str, limit: usize, offset: usize) -> FetchResult<EdgePage> {
            let index = self.calls_for(concept).len();
            self.calls.borrow_mut().push((concept.to_string(), limit, offset));
            match self.pages.get(concept).and_then(|p| p.get(index)) {
                Some(Ok(page)) => Ok(page.clone()),
                Some(Err(_)) | None => Err(FetchError::Transport {
                    url: format!("mock://{concept}"),
                    message: "connection reset".into(),
                }),
            }
        }
    }

    fn page_of(concept: &str, n: usize) -> EdgePage {
        EdgePage {
            edges: (0..n)
                .map(|i| Edge::new(&format!("/c/en/{concept}"), "/r/RelatedTo", &format!("/c/en/thing{i}")))
                .collect(),
        }
    }

    fn transport_err() -> FetchResult<EdgePage> {
        Err(FetchError::Transport {
            url: "mock://".into(),
            message: "down".into(),
        })
    }

    #[test]
    fn pagination_stops_after_short_page() {
        let source = ScriptedSource::default().with_pages(
            "dog",
            vec![Ok(page_of("dog", 3)), Ok(page_of("dog", 3)), Ok(page_of("dog", 1))],
        );
        let fetcher = RelationFetcher::new(source, 3, CN);
        let mut out = TripleSet::new();

        let requests = fetcher.fetch_concept("dog", &mut out);

        assert_eq!(requests, 3);
        assert_eq!(fetcher.source().calls_for("dog"), vec![0, 3, 6]);
    }

    #[test]
    fn full_last_page_triggers_one_more_empty_request() {
        let source = ScriptedSource::default()
            .with_pages("dog", vec![Ok(page_of("dog", 2)), Ok(EdgePage::default())]);
        let fetcher = RelationFetcher::new(source, 2, CN);

        fetcher.fetch_relations(&["dog"].into_iter().collect());

        assert_eq!(fetcher.source().calls_for("dog"), vec![0, 2]);
    }

    #[test]
    fn incomplete_edges_contribute_nothing() {
        let missing_rel = Edge {
            rel: None,
            ..Edge::new("/c/en/dog", "/r/IsA", "/c/en/pet")
        };
        let empty_end = Edge {
            end: Some(IdRef { id: Some(String::new()) }),
            ..Edge::new("/c/en/dog", "/r/IsA", "/c/en/pet")
        };
        let no_id = Edge {
            start: Some(IdRef::default()),
            ..Edge::new("/c/en/dog", "/r/IsA", "/c/en/pet")
        };
        let good = Edge::new("/c/en/dog", "/r/IsA", "/c/en/animal");
        let source = ScriptedSource::default().with_pages(
            "dog",
            vec![Ok(EdgePage {
                edges: vec![missing_rel, empty_end, no_id, good],
            })],
        );
        let fetcher = RelationFetcher::new(source, 2000, CN);

        let triples = fetcher.fetch_relations(&["dog"].into_iter().collect());

        assert_eq!(triples.len(), 1);
        let t = triples.iter().next().unwrap();
        assert_eq!(t.object(), "http://conceptnet.io/c/en/animal");
    }

    #[test]
    fn skipped_edges_still_count_toward_page_size() {
        let mut page = page_of("dog", 1);
        page.edges.push(Edge::default());
        let source = ScriptedSource::default()
            .with_pages("dog", vec![Ok(page), Ok(page_of("dog", 0))]);
        let fetcher = RelationFetcher::new(source, 2, CN);

        fetcher.fetch_relations(&["dog"].into_iter().collect());

        assert_eq!(fetcher.source().calls_for("dog").len(), 2);
    }

    #[test]
    fn failure_aborts_only_that_concept() {
        let source = ScriptedSource::default()
            .with_pages("cat", vec![Ok(page_of("cat", 2)), transport_err()])
            .with_pages("dog", vec![Ok(page_of("dog", 1))]);
        let fetcher = RelationFetcher::new(source, 2, CN);

        let triples = fetcher.fetch_relations(&["cat", "dog"].into_iter().collect());

        // Both cat triples from the first page survive, plus the dog triple.
        assert_eq!(triples.len(), 3);
        assert_eq!(fetcher.source().calls_for("cat"), vec![0, 2]);
        assert_eq!(fetcher.source().calls_for("dog"), vec![0]);
    }

    #[test]
    fn every_concept_failing_yields_empty_set() {
        let fetcher = RelationFetcher::new(ScriptedSource::default(), 10, CN);
        let triples = fetcher.fetch_relations(&["dog", "leash"].into_iter().collect());
        assert!(triples.is_empty());
    }

    #[test]
    fn shared_edges_across_concepts_are_deduplicated() {
        let shared = Edge::new("/c/en/dog", "/r/RelatedTo", "/c/en/leash");
        let source = ScriptedSource::default()
            .with_pages("dog", vec![Ok(EdgePage { edges: vec![shared.clone()] })])
            .with_pages("leash", vec![Ok(EdgePage { edges: vec![shared] })]);
        let fetcher = RelationFetcher::new(source, 10, CN);

        let triples = fetcher.fetch_relations(&["dog", "leash"].into_iter().collect());
        assert_eq!(triples.len(), 1);
    }

    #[test]
    fn api_json_decodes_into_typed_page() {
        let body = r#"{
            "@id": "/c/en/dog",
            "edges": [
                {"@id": "/a/1", "rel": {"@id": "/r/IsA"}, "start": {"@id": "/c/en/dog"}, "end": {"@id": "/c/en/pet"}, "weight": 2.0},
                {"rel": {"@id": "/r/IsA"}, "start": {"@id": "/c/en/dog"}}
            ],
            "view": {"nextPage": "/c/en/dog?offset=20&limit=20"}
        }"#;
        let page: EdgePage = serde_json::from_str(body).unwrap();
        assert_eq!(page.edges.len(), 2);
        assert_eq!(page.edges[0].ids(), Some(("/c/en/dog", "/r/IsA", "/c/en/pet")));
        assert_eq!(page.edges[1].ids(), None);
    }

    #[test]
    fn malformed_edge_is_skipped_not_the_page() {
        let body = r#"{
            "edges": [
                {"rel": {"@id": "/r/IsA"}, "start": {"@id": "/c/en/dog"}, "end": {"@id": "/c/en/pet"}},
                {"rel": "IsA", "start": {"@id": "/c/en/dog"}, "end": {"@id": "/c/en/animal"}},
                {"rel": {"@id": 5}, "start": {"@id": "/c/en/dog"}, "end": {"@id": "/c/en/mammal"}}
            ]
        }"#;
        let page: EdgePage = serde_json::from_str(body).unwrap();
        assert_eq!(page.edges.len(), 3);
        assert_eq!(page.edges[0].ids(), Some(("/c/en/dog", "/r/IsA", "/c/en/pet")));
        assert_eq!(page.edges[1].ids(), None);
        assert_eq!(page.edges[2].ids(), None);
    }

    #[test]
    fn malformed_edges_do_not_stop_pagination() {
        let first: EdgePage = serde_json::from_str(
            r#"{"edges": [
                {"rel": {"@id": "/r/IsA"}, "start": {"@id": "/c/en/dog"}, "end": {"@id": "/c/en/pet"}},
                {"rel": "IsA", "start": {"@id": "/c/en/dog"}, "end": {"@id": "/c/en/animal"}}
            ]}"#,
        )
        .unwrap();
        let source = ScriptedSource::default()
            .with_pages("dog", vec![Ok(first), Ok(page_of("dog", 1))]);
        let fetcher = RelationFetcher::new(source, 2, CN);

        let triples = fetcher.fetch_relations(&["dog"].into_iter().collect());

        assert_eq!(fetcher.source().calls_for("dog"), vec![0, 2]);
        assert_eq!(triples.len(), 2);
    }

    #[test]
    fn body_without_edges_is_an_empty_page() {
        let page: EdgePage = serde_json::from_str("{}").unwrap();
        assert!(page.edges.is_empty());
    }

    #[test]
    fn page_url_format() {
        let client = ConceptNetClient::new("https://api.conceptnet.io/c/en/", Duration::from_secs(5));
        assert_eq!(
            client.page_url("dog", 2000, 4000),
            "https://api.conceptnet.io/c/en/dog?limit=2000&offset=4000"
        );
    }
}
