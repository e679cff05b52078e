use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kgqa::config::DescriptionsConfig;
use kgqa::enrich::{DescriptionEnricher, DescriptionTable, TableKind};
use kgqa::paths::PathFinder;
use kgqa::pipeline::discover_paths;
use kgqa::retrieval::NodeRetriever;
use kgqa::synth::render_path;
use kgqa::{Config, GraphStore, Pipeline, Services};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "kgqa")]
#[command(about = "Answer questions from paths in a biomedical knowledge graph")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $KGQA_CONFIG, then ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Graph document overriding kgqa.graph_path
    #[arg(long, global = true)]
    graph: Option<PathBuf>,

    /// Path budget overriding retrieval.max_paths
    #[arg(long, global = true)]
    max_paths: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and print the answer
    Ask { query: String },
    /// Print the connecting paths without calling any external service
    Paths { query: String },
    /// Print the refined description of one node
    Describe { node_id: String },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let _ = dotenv::dotenv();
            Config::load_from(path)?
        }
        None if std::env::var_os("KGQA_CONFIG").is_none() && !Path::new("config.toml").exists() => {
            let _ = dotenv::dotenv();
            Config::default()
        }
        None => Config::load()?,
    };

    if let Some(graph) = &cli.graph {
        config.kgqa.graph_path = graph.clone();
    }
    if let Some(max_paths) = cli.max_paths {
        config.retrieval.max_paths = max_paths;
    }
    config.validate()?;
    Ok(config)
}

fn load_store(config: &Config) -> Result<GraphStore> {
    let path = config.graph_path();
    GraphStore::load_path(path).with_context(|| format!("Failed to load graph from {}", path.display()))
}

fn build_enricher(services: Services, config: &Config) -> Result<DescriptionEnricher> {
    let DescriptionsConfig { seeded_csv, refined_csv } = &config.descriptions;
    let mut enricher = DescriptionEnricher::new(services).with_page_cache_capacity(config.fetch.page_cache_capacity);

    if let Some(path) = seeded_csv {
        let table = DescriptionTable::from_path(path, TableKind::Seeded)
            .with_context(|| format!("Failed to read seeded descriptions {}", path.display()))?;
        enricher = enricher.with_seeded(table);
    }
    if let Some(path) = refined_csv {
        let table = DescriptionTable::from_path(path, TableKind::Refined)
            .with_context(|| format!("Failed to read refined descriptions {}", path.display()))?;
        enricher = enricher.with_refined(table);
    }

    Ok(enricher)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.kgqa.log_level.as_str())
    ).init();

    log::info!("Starting kgqa v{}", env!("CARGO_PKG_VERSION"));
    let store = load_store(&config)?;

    match &cli.command {
        Command::Paths { query } => {
            let finder = PathFinder::new(config.retrieval.max_paths);
            match discover_paths(&store, &NodeRetriever::default(), &finder, query) {
                Ok(paths) => {
                    for (i, path) in paths.iter().enumerate() {
                        println!("Path {}: {}", i + 1, render_path(&store, path));
                    }
                }
                Err(outcome) => println!("{}", outcome),
            }
        }
        Command::Describe { node_id } => {
            let services = Services::from_config(&config)?;
            let enricher = build_enricher(services, &config)?;
            let description = enricher.describe(&store, node_id).await?;
            println!("{}", description);
        }
        Command::Ask { query } => {
            let services = Services::from_config(&config)?;
            let enricher = build_enricher(services.clone(), &config)?;
            let pipeline = Pipeline::new(store, services)
                .with_path_finder(PathFinder::new(config.retrieval.max_paths))
                .with_enricher(enricher)
                .with_descriptions_in_prompt(config.synthesis.include_descriptions);

            let outcome = pipeline.answer(query).await?;
            println!("{}", outcome);
        }
    }

    Ok(())
}
