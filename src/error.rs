//! Rich diagnostic error types for the concept-kg pipeline.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Most of these never reach the user:
//! the pipeline absorbs I/O failures at the component that made the call and
//! degrades to an empty or partial result. Only configuration errors stop a run.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the concept-kg pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum KgError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Describe(#[from] DescribeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Detect(#[from] DetectError),
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    #[diagnostic(
        code(concept_kg::fetch::transport),
        help(
            "The relation API could not be reached. Check network access and the \
             `api_base` setting."
        )
    )]
    Transport { url: String, message: String },

    #[error("relation API answered {status} for {url}")]
    #[diagnostic(
        code(concept_kg::fetch::status),
        help("The relation API rejected the request. The concept may not exist or the API may be rate limiting.")
    )]
    Status { url: String, status: u16 },

    #[error("could not decode relation page from {url}: {message}")]
    #[diagnostic(
        code(concept_kg::fetch::decode),
        help("The response body was not a JSON document with an `edges` array.")
    )]
    Decode { url: String, message: String },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("insert into {endpoint} failed: {message}")]
    #[diagnostic(
        code(concept_kg::store::insert_failed),
        help(
            "The triple store did not accept the bulk insert. Check that the store is \
             running and the repository exists. Subsequent reads may be stale."
        )
    )]
    InsertFailed { endpoint: String, message: String },

    #[error("query against {endpoint} failed: {message}")]
    #[diagnostic(
        code(concept_kg::store::query_failed),
        help("The triple store rejected or could not answer the query. It is treated as returning no data.")
    )]
    QueryFailed { endpoint: String, message: String },

    #[error("could not serialize triples: {message}")]
    #[diagnostic(
        code(concept_kg::store::serialize),
        help("A triple could not be written as N-Triples. This indicates an invalid IRI slipped past validation.")
    )]
    Serialize { message: String },

    #[error("failed to open in-memory store: {message}")]
    #[diagnostic(
        code(concept_kg::store::open),
        help("The embedded oxigraph store could not be created.")
    )]
    Open { message: String },
}

// ---------------------------------------------------------------------------
// Description errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DescribeError {
    #[error("\"{value}\" does not form a valid IRI under {base}")]
    #[diagnostic(
        code(concept_kg::describe::invalid_iri),
        help("Graph node and label names must be valid IRI path segments.")
    )]
    InvalidIri { base: String, value: String },

    #[error("turtle serialization failed: {message}")]
    #[diagnostic(code(concept_kg::describe::serialize))]
    Serialize { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(concept_kg::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    #[diagnostic(
        code(concept_kg::config::parse),
        help("The config file must be TOML. Unknown keys are rejected.")
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(concept_kg::config::invalid), help("{message}"))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Detection errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DetectError {
    #[error("failed to read labels from {path}")]
    #[diagnostic(
        code(concept_kg::detect::labels),
        help("The label file should hold one detected label per line.")
    )]
    Labels {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for functions returning concept-kg results.
pub type KgResult<T> = std::result::Result<T, KgError>;
