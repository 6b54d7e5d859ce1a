//! onestroke CLI - Euler feasibility checks and puzzle backend access.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use onestroke::{BackendClient, Config, EulerReport, Graph, HealthStatus, VertexId};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "onestroke")]
#[command(version)]
#[command(about = "Euler path feasibility checks and a client for the one-stroke puzzle backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults are used if it does not exist)
    #[arg(short, long, global = true, default_value = "onestroke.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a graph file can be drawn in one stroke
    Check {
        /// Path to graph JSON ({"nodes": [...], "edges": [[a, b], ...]})
        graph: PathBuf,

        /// Also require the edges to form one connected component
        #[arg(long)]
        strict: bool,
    },

    /// Fetch the demo graph from the backend
    Demo,

    /// Fetch a level from the backend
    Level {
        /// Difficulty name, e.g. "easy"
        #[arg(short, long)]
        difficulty: String,

        /// 1-based level index
        #[arg(short, long, default_value = "1")]
        index: u32,
    },

    /// Ask the backend to solve a graph file
    Solve {
        /// Path to graph JSON
        graph: PathBuf,

        /// Send the graph even if the local parity check fails
        #[arg(long)]
        force: bool,
    },

    /// Ask the backend for a next-step hint
    Hint {
        /// Path to hint payload JSON
        payload: PathBuf,
    },

    /// Check that the backend is reachable
    Ping,

    /// Validate configuration file
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"# onestroke configuration file

[backend]
# Override at runtime with ONESTROKE_BACKEND_URL
base_url = "http://localhost:8000"
timeout_secs = 30
max_retries = 3
# Extra headers, values support ${ENV_VAR}
# headers = { "ngrok-skip-browser-warning" = "1" }

[check]
# Require a single connected component in addition to the parity rule
require_connected = false
"#;
    println!("{example}");
}

fn print_report(report: &EulerReport<VertexId>) {
    println!("Edges:       {}", report.edge_count);
    println!("Degrees:");
    for (vertex, degree) in report.degrees.iter() {
        let marker = if degree % 2 == 1 { " (odd)" } else { "" };
        println!("  {:>8}: {degree}{marker}", vertex.to_string());
    }
    println!("Odd:         {}", report.degrees.odd_count());
    println!("Kind:        {}", report.kind);
    println!("Self-loops:  {}", report.loops);
    println!("Connected:   {}", report.connected);
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_default(path).with_context(|| format!("Failed to load config from {path:?}"))
}

fn backend(config: &Config) -> Result<BackendClient> {
    let client = BackendClient::from_config(config).context("Failed to create backend client")?;
    info!(base_url = client.base_url(), "Using backend");
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Validate => {
            let config = Config::from_file(&cli.config)
                .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

            let base_url = config
                .resolve_base_url()
                .context("Failed to resolve backend URL")?;

            info!("Configuration is valid");
            info!("  Backend: {base_url}");
            info!(
                "  Timeout: {}s, attempts: {}",
                config.backend.timeout_secs, config.backend.max_retries
            );
            info!("  Require connected: {}", config.check.require_connected);
        }

        Commands::Check { graph, strict } => {
            let config = load_config(&cli.config)?;
            let graph = Graph::from_file(&graph)
                .with_context(|| format!("Failed to load graph from {graph:?}"))?;

            let report = graph.analyze();
            print_report(&report);

            let require_connected = strict || config.check.require_connected;
            let passed = report.passes(require_connected);

            if report.is_disconnected_candidate() && !require_connected {
                warn!("Parity allows a drawing, but the edges are not connected");
            }

            println!("Result:      {}", if passed { "possible" } else { "impossible" });
            if !passed {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Demo => {
            let config = load_config(&cli.config)?;
            let graph = backend(&config)?.fetch_demo().await?;

            println!("{}", serde_json::to_string_pretty(&graph)?);
            print_report(&graph.analyze());
        }

        Commands::Level { difficulty, index } => {
            let config = load_config(&cli.config)?;
            let graph = backend(&config)?
                .fetch_level(&difficulty, index)
                .await
                .with_context(|| format!("Failed to fetch level {difficulty}#{index}"))?;

            println!("{}", serde_json::to_string_pretty(&graph)?);
            print_report(&graph.analyze());
        }

        Commands::Solve { graph, force } => {
            let config = load_config(&cli.config)?;
            let graph = Graph::from_file(&graph)
                .with_context(|| format!("Failed to load graph from {graph:?}"))?;

            if !graph.check() {
                if !force {
                    println!("Local check: impossible ({}), not sending", graph.analyze().kind);
                    return Ok(ExitCode::FAILURE);
                }
                warn!("Local parity check failed, sending anyway");
            }

            let solved = backend(&config)?.solve_graph(&graph).await?;
            match solved.path() {
                Some(path) => {
                    let walk: Vec<String> = path.iter().map(ToString::to_string).collect();
                    println!("Path:        {}", walk.join(" -> "));
                }
                None => {
                    println!(
                        "No path:     {}",
                        solved.error.as_deref().unwrap_or("backend gave no reason")
                    );
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Hint { payload } => {
            let config = load_config(&cli.config)?;
            let content = std::fs::read_to_string(&payload)
                .with_context(|| format!("Failed to read hint payload {payload:?}"))?;
            let payload: serde_json::Value =
                serde_json::from_str(&content).context("Hint payload is not valid JSON")?;

            let hint = backend(&config)?.hint_next(&payload).await?;
            println!("{}", serde_json::to_string_pretty(&hint)?);
        }

        Commands::Ping => {
            let config = load_config(&cli.config)?;
            let result = backend(&config)?.health_check().await;

            match result.latency_ms {
                Some(latency) => println!("{}: {} ({latency} ms)", result.base_url, result.status),
                None => println!("{}: {}", result.base_url, result.status),
            }
            if let Some(error) = &result.error {
                println!("  {error}");
            }
            if result.status != HealthStatus::Healthy {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
