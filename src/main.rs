use clap::{Parser, Subcommand};
use serde::Serialize;

use kg_retrieval::config::AppConfig;
use kg_retrieval::service::GraphRagService;
use kg_retrieval::types::RetrievalRequest;

#[derive(Parser)]
#[command(name = "kg-retrieval")]
#[command(about = "Knowledge-graph entity resolution and retrieval")]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print node/edge counts and type distributions
    Stats,

    /// Merge near-duplicate entities and print the audit
    Resolve {
        #[arg(long)]
        dry_run: bool,

        /// Similarity threshold in [0, 1]; defaults to --resolution-threshold
        #[arg(long)]
        threshold: Option<f32>,
    },

    /// Run one retrieval strategy
    Retrieve {
        #[arg(long)]
        query: String,

        /// bfs, dfs, pagerank, community_detection, semantic_similarity, n_hop or hybrid
        #[arg(long, default_value = "hybrid")]
        algorithm: String,

        /// Start node ids; inferred from the query when omitted
        #[arg(long = "start", num_args = 1..)]
        start: Vec<String>,

        /// Extra retrieval settings as key=value
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Intent-aware fusion-ranked entity and relation search
    Search {
        #[arg(long)]
        query: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&cli.config.log_level)
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = cli.config.graph.clone() else {
        anyhow::bail!("no graph file given (use --graph or GRAPH_PATH)");
    };

    let service = GraphRagService::new(&cli.config);
    let report = service.load_path(&path, cli.config.graph_kind()).await?;
    tracing::info!(path = %path.display(), report = ?report, "Graph loaded");

    match cli.command {
        Command::Stats => print_json(&service.stats().await?)?,
        Command::Resolve { dry_run, threshold } => {
            let audit = service.resolve_entities(threshold, dry_run).await?;
            print_json(&audit)?;
        }
        Command::Retrieve {
            query,
            algorithm,
            start,
            set,
        } => {
            service.set_config("retrieval_algorithm", &algorithm).await?;
            for pair in &set {
                let Some((key, value)) = pair.split_once('=') else {
                    anyhow::bail!("expected KEY=VALUE, got {pair:?}");
                };
                service.set_config(key.trim(), value.trim()).await?;
            }
            let mut request = RetrievalRequest::new(query);
            if !start.is_empty() {
                request = request.with_start_nodes(start);
            }
            print_json(&service.retrieve(&request).await?)?;
        }
        Command::Search { query } => print_json(&service.search(&query).await?)?,
    }

    service.shutdown().await;
    Ok(())
}
