//! CLI command implementations.

use crate::{ArangoArgs, RunArgs, TypesenseArgs};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lattice_core::EntityGraph;
use lattice_ingest::{
    run_graph, run_search, GraphRunStats, SearchRunStats, GRAPH_BATCH_SIZE, SEARCH_BATCH_SIZE,
    SEARCH_COLLECTION,
};
use lattice_sink::{
    ArangoConfig, ArangoSink, BatchWriter, MemorySink, Provisioned, Sink, StoreSink,
    TypesenseConfig, TypesenseSink,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// A destination that can move onto a blocking worker.
type BoxedSink = Box<dyn Sink + Send>;

/// Write the property graph.
pub fn graph(run: &RunArgs, arango: &ArangoArgs) -> Result<()> {
    let entities = load_input(&run.input)?;
    let sink = graph_sink(run, arango)?;

    let spinner = spinner("Writing property graph...")?;
    let stats = run_graph(
        &entities,
        BatchWriter::new(sink, run.batch_size.unwrap_or(GRAPH_BATCH_SIZE)),
    );
    spinner.finish_and_clear();

    summarize(Some(&stats), None, run.json)?;
    enforce_strict(run.strict, Some(&stats), None)
}

/// Write the search documents.
pub fn search(run: &RunArgs, typesense: &TypesenseArgs) -> Result<()> {
    let entities = load_input(&run.input)?;
    let sink = search_sink(run, typesense)?;

    let spinner = spinner("Writing search documents...")?;
    let stats = run_search(
        &entities,
        &typesense.collection,
        BatchWriter::new(sink, run.batch_size.unwrap_or(SEARCH_BATCH_SIZE)),
    );
    spinner.finish_and_clear();

    summarize(None, Some(&stats), run.json)?;
    enforce_strict(run.strict, None, Some(&stats))
}

/// Write both representations at once.
///
/// The input is loaded once and shared; each run gets its own destination
/// and writer on a blocking worker.
pub async fn all(run: RunArgs, arango: ArangoArgs, typesense: TypesenseArgs) -> Result<()> {
    let entities = Arc::new(load_input(&run.input)?);

    // Connect both before writing anything so a bad destination fails fast.
    let graph_sink = graph_sink(&run, &arango)?;
    let search_sink = search_sink(&run, &typesense)?;
    let graph_batch = run.batch_size.unwrap_or(GRAPH_BATCH_SIZE);
    let search_batch = run.batch_size.unwrap_or(SEARCH_BATCH_SIZE);

    let spinner = spinner("Writing property graph and search documents...")?;

    let graph_task = {
        let entities = Arc::clone(&entities);
        tokio::task::spawn_blocking(move || {
            run_graph(&entities, BatchWriter::new(graph_sink, graph_batch))
        })
    };
    let search_task = {
        let entities = Arc::clone(&entities);
        let collection = typesense.collection.clone();
        tokio::task::spawn_blocking(move || {
            run_search(
                &entities,
                &collection,
                BatchWriter::new(search_sink, search_batch),
            )
        })
    };

    let (graph_stats, search_stats) = tokio::try_join!(graph_task, search_task)?;
    spinner.finish_and_clear();

    summarize(Some(&graph_stats), Some(&search_stats), run.json)?;
    enforce_strict(run.strict, Some(&graph_stats), Some(&search_stats))
}

/// Dry run: transform everything in memory and report.
pub fn inspect(input: &Path, json: bool) -> Result<()> {
    let entities = load_input(input)?;

    let mut graph = MemorySink::new();
    let graph_stats = run_graph(&entities, BatchWriter::new(&mut graph, GRAPH_BATCH_SIZE));

    let mut search = MemorySink::new();
    let search_stats = run_search(
        &entities,
        SEARCH_COLLECTION,
        BatchWriter::new(&mut search, SEARCH_BATCH_SIZE),
    );

    summarize(Some(&graph_stats), Some(&search_stats), json)
}

fn load_input(path: &Path) -> Result<EntityGraph> {
    let spinner = spinner(&format!("Loading {}...", path.display()))?;
    let loaded = EntityGraph::load(path);
    spinner.finish_and_clear();

    let entities = loaded?;
    eprintln!(
        "{} Loaded {} entities from {}",
        "✓".green(),
        entities.len().to_string().cyan(),
        path.display()
    );
    Ok(entities)
}

fn graph_sink(run: &RunArgs, arango: &ArangoArgs) -> Result<BoxedSink> {
    if let Some(dir) = &run.store {
        let store = StoreSink::open(dir.join("graph"))?;
        eprintln!(
            "{} Writing graph to local store {}",
            "✓".green(),
            dir.display()
        );
        return Ok(Box::new(store));
    }

    let config = ArangoConfig {
        url: arango.arango_url.clone(),
        database: arango.db.clone(),
        username: arango.user.clone(),
        password: arango.password.clone(),
        timeout: Duration::from_secs(run.timeout_secs),
    };
    let sink = ArangoSink::connect(&config)?;

    if run.skip_setup {
        info!("Skipping graph provisioning");
    } else {
        sink.ensure_schema(&arango.graph)?;
        eprintln!(
            "{} Graph {} ready in database {}",
            "✓".green(),
            arango.graph.cyan(),
            arango.db.cyan()
        );
    }
    Ok(Box::new(sink))
}

fn search_sink(run: &RunArgs, typesense: &TypesenseArgs) -> Result<BoxedSink> {
    if let Some(dir) = &run.store {
        let store = StoreSink::open(dir.join("search"))?;
        eprintln!(
            "{} Writing search documents to local store {}",
            "✓".green(),
            dir.display()
        );
        return Ok(Box::new(store));
    }

    let config = TypesenseConfig {
        url: typesense.typesense_url.clone(),
        api_key: typesense.api_key.clone(),
        timeout: Duration::from_secs(run.timeout_secs),
    };
    let sink = TypesenseSink::connect(&config)?;

    if run.skip_setup {
        info!("Skipping collection provisioning");
    } else {
        let verb = match sink.ensure_collection(&typesense.collection)? {
            Provisioned::Created => "created",
            Provisioned::Existing => "exists",
        };
        eprintln!(
            "{} Collection {} {}",
            "✓".green(),
            typesense.collection.cyan(),
            verb
        );
    }
    Ok(Box::new(sink))
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    Ok(spinner)
}

fn summarize(
    graph: Option<&GraphRunStats>,
    search: Option<&SearchRunStats>,
    json: bool,
) -> Result<()> {
    if json {
        let mut output = serde_json::Map::new();
        if let Some(stats) = graph {
            output.insert("graph".into(), serde_json::to_value(stats)?);
        }
        if let Some(stats) = search {
            output.insert("search".into(), serde_json::to_value(stats)?);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if let Some(stats) = graph {
        print_graph(stats);
    }
    if let Some(stats) = search {
        print_search(stats);
    }
    Ok(())
}

fn print_graph(stats: &GraphRunStats) {
    println!(
        "{} Wrote {} nodes and {} edges in {}ms",
        "✓".green(),
        stats.nodes_written.to_string().cyan(),
        stats.edges_written.to_string().cyan(),
        stats.elapsed_ms
    );

    println!("\n{}", "Nodes".bold());
    for (class, count) in &stats.nodes_by_class {
        println!("  {:<14} {}", class, count);
    }
    println!(
        "  {:<14} {}",
        "skipped".dimmed(),
        stats.entities - stats.nodes_classified
    );

    println!("\n{}", "Edges".bold());
    for (class, count) in &stats.edges_by_class {
        println!("  {:<14} {}", class, count);
    }

    if !stats.dropped.is_empty() {
        println!(
            "\n{} {} of {} relations produced no edge:",
            "•".blue(),
            stats.dropped_total(),
            stats.relations
        );
        for (reason, count) in &stats.dropped {
            println!("  {:<22} {}", reason.dimmed(), count);
        }
    }

    print_failures(stats.failed_batches, stats.failed_documents);
}

fn print_search(stats: &SearchRunStats) {
    println!(
        "{} Indexed {} of {} entities into {} in {}ms",
        "✓".green(),
        stats.written.to_string().cyan(),
        stats.entities,
        stats.collection.cyan(),
        stats.elapsed_ms
    );
    print_failures(stats.failed_batches, stats.failed_documents);
}

fn print_failures(batches: usize, documents: usize) {
    if batches > 0 || documents > 0 {
        println!(
            "{} {} failed batches, {} documents not written",
            "⚠".yellow(),
            batches.to_string().red(),
            documents.to_string().red()
        );
    }
}

fn enforce_strict(
    strict: bool,
    graph: Option<&GraphRunStats>,
    search: Option<&SearchRunStats>,
) -> Result<()> {
    if !strict {
        return Ok(());
    }
    let failed = graph.map_or(0, |s| s.failed_batches + s.failed_documents)
        + search.map_or(0, |s| s.failed_batches + s.failed_documents);
    if failed > 0 {
        return Err("some documents were not written (--strict)".into());
    }
    Ok(())
}
