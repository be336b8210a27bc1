//! concept-kg CLI: detected labels to a pruned ConceptNet knowledge graph.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use concept_kg::concept::{ConceptSet, LabelFileDetector};
use concept_kg::config::{PipelineConfig, StoreBackend};
use concept_kg::export::GraphExport;
use concept_kg::graph::KnowledgeGraph;
use concept_kg::pipeline::{Pipeline, PipelineOutcome};
use concept_kg::rdf;

#[derive(Parser)]
#[command(name = "concept-kg", version, about = "Detected concepts to a pruned knowledge graph")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Triple store backend.
    #[arg(long, global = true, value_enum)]
    store: Option<StoreBackend>,

    /// Base URL of the triple store server.
    #[arg(long, global = true)]
    store_base: Option<String>,

    /// Repository name on the triple store server.
    #[arg(long, global = true)]
    repository: Option<String>,

    /// Edges requested per ConceptNet page.
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Row cap on the relevance query.
    #[arg(long, global = true)]
    result_limit: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConceptArgs {
    /// Concept label (repeatable), e.g. `-c dog -c leash`.
    #[arg(long = "concept", short = 'c')]
    concepts: Vec<String>,

    /// File with one detected label per line.
    #[arg(long)]
    labels: Option<PathBuf>,
}

impl ConceptArgs {
    fn resolve(&self) -> Result<ConceptSet> {
        let mut set: ConceptSet = self.concepts.iter().collect();
        if let Some(path) = &self.labels {
            for label in LabelFileDetector::read_labels(path)?.iter() {
                set.insert(label);
            }
        }
        Ok(set)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch ConceptNet relations and print them as N-Triples.
    Fetch {
        #[command(flatten)]
        input: ConceptArgs,
    },

    /// Fetch relations and insert them into the triple store.
    Ingest {
        #[command(flatten)]
        input: ConceptArgs,
    },

    /// Print the pruned graph for concepts already in the store.
    Graph {
        #[command(flatten)]
        input: ConceptArgs,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the Turtle description of the pruned graph.
    Describe {
        #[command(flatten)]
        input: ConceptArgs,
    },

    /// Ingest, extract and describe in one go.
    Run {
        #[command(flatten)]
        input: ConceptArgs,

        /// Image whose `<image>.labels` sidecar (or `--labels` file) lists detections.
        #[arg(long, conflicts_with = "concepts")]
        image: Option<PathBuf>,

        /// Print the graph as JSON instead of Turtle.
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(store) = cli.store {
        config.store = store;
    }
    if let Some(base) = &cli.store_base {
        config.store_base = base.clone();
    }
    if let Some(repository) = &cli.repository {
        config.repository = repository.clone();
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if let Some(limit) = cli.result_limit {
        config.result_limit = limit;
    }
    config.validate()?;
    Ok(config)
}

fn print_graph(graph: &KnowledgeGraph, concepts: &ConceptSet, json: bool) -> Result<()> {
    if json {
        let export = GraphExport::new(graph, concepts);
        println!("{}", serde_json::to_string_pretty(&export).into_diagnostic()?);
        return Ok(());
    }
    if graph.is_empty() {
        println!("Nothing to show.");
        return Ok(());
    }
    println!("Graph ({} nodes, {} edges):", graph.node_count(), graph.edge_count());
    for (u, v, label) in graph.edges() {
        println!("  {u} -[{label}]- {v}");
    }
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let pipeline = Pipeline::new(config)?;

    match cli.command {
        Commands::Fetch { input } => {
            let concepts = input.resolve()?;
            let triples = pipeline.fetch_relations(&concepts);
            print!("{}", rdf::to_ntriples(&triples)?);
        }

        Commands::Ingest { input } => {
            let concepts = input.resolve()?;
            let summary = pipeline.ingest(&concepts);
            println!(
                "Fetched {} triples for {} concepts (stored: {})",
                summary.triples, summary.concepts, summary.stored
            );
        }

        Commands::Graph { input, json } => {
            let concepts = input.resolve()?;
            let graph = pipeline.extract(&concepts);
            print_graph(&graph, &concepts, json)?;
        }

        Commands::Describe { input } => {
            let concepts = input.resolve()?;
            print!("{}", pipeline.describe_concepts(&concepts)?);
        }

        Commands::Run { input, image, json } => {
            let outcome = match image {
                Some(image) => {
                    let detector = match &input.labels {
                        Some(path) => LabelFileDetector::fixed(path),
                        None => LabelFileDetector::sidecar(),
                    };
                    pipeline.run_detector(&detector, &image)
                }
                None => pipeline.run(&input.resolve()?),
            };

            match outcome {
                PipelineOutcome::NothingDetected => println!("Nothing detected."),
                PipelineOutcome::Graph(report) => {
                    eprint!("{report}");
                    if json {
                        print_graph(&report.graph, &report.concepts, true)?;
                    } else {
                        match &report.description {
                            Some(turtle) => print!("{turtle}"),
                            None => println!("No description produced."),
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
