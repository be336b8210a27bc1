//! GraphDB/RDF4J repository over HTTP.
//!
//! Writes go to `{base}/repositories/{repo}/statements` as a SPARQL update,
//! reads go to `{base}/repositories/{repo}` as a form-encoded SPARQL query
//! answered in the SPARQL 1.1 JSON results format.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::PipelineConfig;
use crate::error::StoreError;
use crate::rdf::TripleSet;

use super::{insert_data_update, Solution, StoreResult, TripleStore};

const SPARQL_UPDATE: &str = "application/sparql-update";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// `{"type": "uri", "value": "http://..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct BindingTerm {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub bindings: Vec<BTreeMap<String, BindingTerm>>,
}

/// SPARQL 1.1 query results, JSON serialization.
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResults {
    pub results: Option<ResultSet>,
}

impl SparqlResults {
    /// Rows in document order. `None` for ASK-style documents without `results`.
    pub fn into_solutions(self) -> Option<Vec<Solution>> {
        let set = self.results?;
        Some(
            set.bindings
                .into_iter()
                .map(|binding| {
                    let mut row = Solution::new();
                    for (var, term) in binding {
                        row.insert(var, term.value);
                    }
                    row
                })
                .collect(),
        )
    }
}

/// Remote triple store client.
pub struct RemoteStore {
    statements_url: String,
    query_url: String,
    agent: ureq::Agent,
}

impl RemoteStore {
    pub fn new(config: &PipelineConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build();
        Self {
            statements_url: config.statements_endpoint(),
            query_url: config.query_endpoint(),
            agent,
        }
    }

    pub fn statements_url(&self) -> &str {
        &self.statements_url
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }
}

fn error_message(e: ureq::Error) -> String {
    match e {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            let preview: String = body.chars().take(300).collect();
            format!("HTTP {code}: {preview}")
        }
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}

impl TripleStore for RemoteStore {
    fn try_insert(&self, triples: &TripleSet) -> StoreResult<()> {
        if triples.is_empty() {
            tracing::debug!("nothing to insert");
            return Ok(());
        }
        let update = insert_data_update(triples)?;
        tracing::debug!(
            endpoint = %self.statements_url,
            count = triples.len(),
            bytes = update.len(),
            "sending INSERT DATA"
        );

        self.agent
            .post(&self.statements_url)
            .set("Content-Type", SPARQL_UPDATE)
            .send_string(&update)
            .map_err(|e| StoreError::InsertFailed {
                endpoint: self.statements_url.clone(),
                message: error_message(e),
            })?;
        Ok(())
    }

    fn select(&self, query: &str) -> StoreResult<Vec<Solution>> {
        let query_failed = |message: String| StoreError::QueryFailed {
            endpoint: self.query_url.clone(),
            message,
        };
        tracing::debug!(endpoint = %self.query_url, "sending SPARQL query");

        let response = self
            .agent
            .post(&self.query_url)
            .set("Accept", SPARQL_RESULTS_JSON)
            .send_form(&[("query", query)])
            .map_err(|e| query_failed(error_message(e)))?;

        let results: SparqlResults = response
            .into_json()
            .map_err(|e| query_failed(format!("failed to parse JSON results: {e}")))?;

        results
            .into_solutions()
            .ok_or_else(|| query_failed("response has no `results` member".into()))
    }
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("statements_url", &self.statements_url)
            .field("query_url", &self.query_url)
            .finish()
    }
}
