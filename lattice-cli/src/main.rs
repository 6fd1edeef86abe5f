//! Lattice CLI - Command-line interface for Lattice
//!
//! This is the main entry point for loading an extracted code graph into
//! the graph database and the search engine.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "lattice")]
#[command(author = "Lattice Contributors")]
#[command(version)]
#[command(about = "Loads an extracted code graph into ArangoDB and Typesense", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the property graph to ArangoDB
    Graph {
        #[command(flatten)]
        run: RunArgs,

        #[command(flatten)]
        arango: ArangoArgs,
    },

    /// Write the search documents to Typesense
    Search {
        #[command(flatten)]
        run: RunArgs,

        #[command(flatten)]
        typesense: TypesenseArgs,
    },

    /// Write both representations concurrently
    All {
        #[command(flatten)]
        run: RunArgs,

        #[command(flatten)]
        arango: ArangoArgs,

        #[command(flatten)]
        typesense: TypesenseArgs,
    },

    /// Classify and resolve in memory and print statistics, writing nothing
    Inspect {
        /// Entity graph JSON produced by the extractor
        #[arg(short, long, env = "LATTICE_INPUT", default_value = lattice_ingest::DEFAULT_INPUT)]
        input: PathBuf,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
}

/// Options shared by every writing command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Entity graph JSON produced by the extractor
    #[arg(short, long, env = "LATTICE_INPUT", default_value = lattice_ingest::DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Documents per bulk request (default: 1000 for the graph, 100 for search)
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout_secs: u64,

    /// Write to a local sled store in this directory instead of the servers
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Do not create databases, collections or graphs
    #[arg(long)]
    pub skip_setup: bool,

    /// Exit with an error if any batch failed
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    pub json: bool,
}

/// ArangoDB connection.
#[derive(Args, Debug, Clone)]
pub struct ArangoArgs {
    /// ArangoDB server URL
    #[arg(long, env = "ARANGO_URL", default_value = "http://localhost:8529")]
    pub arango_url: String,

    /// Database name
    #[arg(long, env = "ARANGO_DB", default_value = "codegraph")]
    pub db: String,

    /// Username
    #[arg(long, env = "ARANGO_USER", default_value = "root")]
    pub user: String,

    /// Password
    #[arg(long, env = "ARANGO_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Named graph to create
    #[arg(long, default_value = lattice_ingest::GRAPH_NAME)]
    pub graph: String,
}

/// Typesense connection.
#[derive(Args, Debug, Clone)]
pub struct TypesenseArgs {
    /// Typesense server URL (port 8108 when none is given)
    #[arg(long, env = "TYPESENSE_URL", default_value = "http://localhost:8108")]
    pub typesense_url: String,

    /// API key
    #[arg(long, env = "TYPESENSE_API_KEY", default_value = "xyz", hide_env_values = true)]
    pub api_key: String,

    /// Search collection name
    #[arg(long, default_value = lattice_ingest::SEARCH_COLLECTION)]
    pub collection: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging; RUST_LOG wins over the verbosity flag.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let result = match cli.command {
        Commands::Graph { run, arango } => commands::graph(&run, &arango),
        Commands::Search { run, typesense } => commands::search(&run, &typesense),
        Commands::All {
            run,
            arango,
            typesense,
        } => commands::all(run, arango, typesense).await,
        Commands::Inspect { input, json } => commands::inspect(&input, json),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
