use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use semroute::prelude::*;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Route free-text queries to the closest configured topic
#[derive(Parser, Debug)]
#[command(name = "semroute")]
#[command(about = "A semantic query router", long_about = None)]
struct Args {
    /// Router definition (JSON). Defaults to the built-in topic classifier
    #[arg(short, long)]
    routes: Option<PathBuf>,

    /// Embedding dimension of the hashing embedder
    #[arg(long, default_value_t = semroute_core::DEFAULT_EMBEDDING_DIM)]
    dim: usize,

    /// Maximum number of matches reported per query
    #[arg(long)]
    max_k: Option<usize>,

    /// How reference distances collapse into a route distance
    #[arg(long, value_enum)]
    aggregation: Option<AggregationArg>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the configured routes
    Info,
    /// Route one query to its best matching route
    Route { query: String },
    /// Show every route a query matches
    Multi { query: String },
    /// Route the built-in sample queries
    Demo,
    /// Read queries from stdin until `quit`
    Interactive,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AggregationArg {
    Min,
    Avg,
}

impl From<AggregationArg> for Aggregation {
    fn from(arg: AggregationArg) -> Self {
        match arg {
            AggregationArg::Min => Aggregation::Min,
            AggregationArg::Avg => Aggregation::Avg,
        }
    }
}

#[derive(Serialize)]
struct RouteReport<'a> {
    query: &'a str,
    #[serde(flatten)]
    decision: &'a Decision,
    confidence_percent: Option<f32>,
}

#[derive(Serialize)]
struct MultiReport<'a> {
    query: &'a str,
    matches: Vec<MatchReport>,
}

#[derive(Serialize)]
struct MatchReport {
    route_name: String,
    distance: f32,
    confidence: f32,
}

impl From<RouteMatch> for MatchReport {
    fn from(m: RouteMatch) -> Self {
        Self {
            confidence: m.confidence_percent(),
            route_name: m.route_id,
            distance: m.distance,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut definition = match &args.routes {
        Some(path) => RouterDefinition::from_path(path)
            .with_context(|| format!("failed to load router definition {:?}", path))?,
        None => presets::topic_router(),
    };
    if let Some(max_k) = args.max_k {
        definition.routing.max_k = Some(max_k);
    }
    if let Some(aggregation) = args.aggregation {
        definition.routing.aggregation = aggregation.into();
    }

    info!("Starting semroute v{}", env!("CARGO_PKG_VERSION"));
    let embedder = Arc::new(HashEmbedder::new(args.dim)?);
    let router = SemanticRouter::new(&definition, embedder)?;

    match &args.command {
        Command::Info => print_json(&router.routes_info())?,
        Command::Route { query } => route_one(&router, query)?,
        Command::Multi { query } => route_multi(&router, query)?,
        Command::Demo => {
            for query in presets::demo_queries() {
                route_one(&router, query)?;
            }
        }
        Command::Interactive => interactive(&router)?,
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn route_one(router: &SemanticRouter, query: &str) -> anyhow::Result<()> {
    let decision = router.route(query)?;
    print_json(&RouteReport {
        query,
        decision: &decision,
        confidence_percent: decision.confidence_percent(),
    })
}

fn route_multi(router: &SemanticRouter, query: &str) -> anyhow::Result<()> {
    let matches = router.route_many(query, None)?;
    print_json(&MultiReport {
        query,
        matches: matches.into_iter().map(MatchReport::from).collect(),
    })
}

fn interactive(router: &SemanticRouter) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        eprint!("query> ");
        io::stderr().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let input = line?;
        let input = input.trim();

        match input.to_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" | "q" => break,
            "info" => {
                print_json(&router.routes_info())?;
                continue;
            }
            _ => {}
        }

        let result = if let Some(query) = multi_query(input) {
            route_multi(router, query)
        } else if input.eq_ignore_ascii_case("multi") {
            eprintln!("multi needs a query");
            continue;
        } else {
            route_one(router, input)
        };
        if let Err(e) = result {
            eprintln!("error: {:#}", e);
        }
    }

    Ok(())
}

/// Query text after a case-insensitive `multi ` prefix
fn multi_query(input: &str) -> Option<&str> {
    let prefix = input.get(..6)?;
    if !prefix.eq_ignore_ascii_case("multi ") {
        return None;
    }
    Some(input[6..].trim()).filter(|q| !q.is_empty())
}
