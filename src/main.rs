use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use megasena_analytics::api::{build_router, state::AppState};
use megasena_analytics::config::AppConfig;
use megasena_analytics::display;
use megasena_analytics::fetch::{parse_url, Fetcher};
use megasena_analytics::models::Combination;
use megasena_analytics::session::SessionLoader;
use megasena_analytics::source::{DrawSource, FileDrawSource, HttpDrawSource};
use megasena_analytics::storage::{StorageConfig, TableStore};

#[derive(Parser)]
#[command(name = "megasena")]
#[command(about = "Mega-Sena draw history analytics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./megasena.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Read draws from a local JSON file instead of the API
    #[arg(long)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-download the draw history and rebuild the table cache
    Refresh,

    /// Draw summary and number frequencies
    Stats {
        /// Rows in the most/least drawn tables
        #[arg(long, default_value = "10")]
        top: usize,

        /// Read frequencies from the CSV table cache when present
        #[arg(long)]
        cached_tables: bool,
    },

    /// Prize winners by municipality and state
    Prizes {
        #[arg(long, default_value = "10")]
        top: usize,

        /// Break down a single state (e.g. SP)
        #[arg(long)]
        state: Option<String>,

        /// Rebuild the rankings from the CSV winner events when present
        #[arg(long)]
        cached_tables: bool,
    },

    /// Combinations drawn more than once
    Repeats {
        /// Check whether a combination was ever drawn (e.g. "04 08 15 16 23 42")
        #[arg(long)]
        check: Option<String>,
    },

    /// Suggest games from frequency strata
    Suggest {
        /// Games per category
        #[arg(long)]
        count: Option<usize>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

fn build_loader(config: &AppConfig, storage: &StorageConfig, input: Option<PathBuf>) -> Result<SessionLoader> {
    let source: Box<dyn DrawSource> = match input {
        Some(path) => Box::new(FileDrawSource::new(path)),
        None => {
            let url = parse_url(&config.source.api_url)?;
            let fetcher = Fetcher::new(config.source.fetcher_config(storage.raw_dir()))?;
            Box::new(HttpDrawSource::new(fetcher, url))
        }
    };

    Ok(SessionLoader::new(source, config.analysis.clone())
        .with_table_store(TableStore::for_config(storage)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting megasena v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());
    let loader = build_loader(&config, &storage, cli.input)?;

    match cli.command {
        Commands::Refresh => {
            let session = loader.reload().await;
            if let Some(error) = session.source_error() {
                bail!("Draw source unavailable: {}", error);
            }
            let report = session.report();
            println!("Records read:        {}", report.total);
            println!("Draws normalized:    {}", report.normalized);
            println!("Records skipped:     {}", report.skipped);
            println!("Duplicate contests:  {}", report.duplicates);
            println!("Incomplete numbers:  {}", report.incomplete_numbers);
            println!("Missing dates:       {}", report.missing_dates);
            println!("Tables written to {}", storage.tables_dir().display());
        }
        Commands::Stats { top, cached_tables } => {
            let cached = if cached_tables {
                loader.cached_frequencies()
            } else {
                None
            };

            let frequencies = match cached {
                Some(table) => {
                    tracing::info!("Using cached frequency table");
                    println!(
                        "Frequencies read from {} (run without --cached-tables for the draw summary)",
                        storage.tables_dir().display()
                    );
                    table
                }
                None => {
                    let session = loader.load().await;
                    println!("{}", display::summary_table(session.summary(), session.report()));
                    session.frequencies().clone()
                }
            };

            if frequencies.is_empty() {
                println!("No draw data available.");
                return Ok(());
            }

            let total = frequencies.total();
            println!("\nMost drawn");
            println!("{}", display::frequency_table(&frequencies.top(top), total));
            println!("\nLeast drawn");
            println!("{}", display::frequency_table(&frequencies.bottom(top), total));
        }
        Commands::Prizes {
            top,
            state,
            cached_tables,
        } => {
            let cached = if cached_tables {
                loader.cached_prizes()
            } else {
                None
            };

            let prizes = match cached {
                Some(prizes) => {
                    tracing::info!("Using cached winner events table");
                    prizes
                }
                None => loader.load().await.prizes().clone(),
            };
            if prizes.is_empty() {
                println!("No prize winner locations available.");
                return Ok(());
            }

            match state {
                Some(uf) => match prizes.state_breakdown(&uf, top) {
                    Some(breakdown) => {
                        println!("{} ({} winners)", breakdown.state, breakdown.total);
                        println!("{}", display::breakdown_table(&breakdown));
                    }
                    None => println!("No prize winners recorded for state {}.", uf),
                },
                None => {
                    println!(
                        "{} winners across {} municipalities in {} states\n",
                        prizes.total_winners(),
                        prizes.distinct_municipalities(),
                        prizes.distinct_states()
                    );
                    println!(
                        "{}",
                        display::municipality_table(&prizes.top_municipalities(top))
                    );
                    println!(
                        "{}",
                        display::state_table(&prizes.state_ranking(), prizes.total_winners())
                    );
                }
            }
        }
        Commands::Repeats { check } => {
            let session = loader.load().await;
            match check {
                Some(numbers) => {
                    let combination: Combination = numbers
                        .parse()
                        .with_context(|| format!("invalid combination {:?}", numbers))?;
                    let contests = session.lookup(&combination);
                    if contests.is_empty() {
                        println!("{} has never been drawn.", combination.display_key());
                    } else {
                        let list: Vec<String> = contests.iter().map(|c| c.to_string()).collect();
                        println!(
                            "{} was drawn in contest(s) {}.",
                            combination.display_key(),
                            list.join(", ")
                        );
                    }
                }
                None => {
                    let repeats = session.index().repeats();
                    println!(
                        "{} distinct combinations, {} repeats",
                        session.index().len(),
                        session.total_repeats()
                    );
                    if repeats.is_empty() {
                        println!("No combination has been drawn more than once.");
                    } else {
                        println!("{}", display::repeats_table(&repeats));
                    }
                }
            }
        }
        Commands::Suggest { count, seed } => {
            let count = count.unwrap_or(config.suggestions.default_count);
            if count == 0 || count > config.suggestions.max_count {
                bail!(
                    "--count must be between 1 and {}",
                    config.suggestions.max_count
                );
            }

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            };
            let session = loader.load().await;
            let set = session.suggest(count, &mut rng);
            println!("{}", display::suggestions_table(&set));
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let state = AppState::load(loader, config.suggestions.clone())
                .await
                .with_cors_origin(config.server.cors_origin.clone());
            let app = build_router(state);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
