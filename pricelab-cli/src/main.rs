//! PriceLab CLI: price predictions, history, symbol catalogue, HTTP server.
//!
//! Commands:
//! - `predict`: forecast the next close of one symbol
//! - `batch`: predict many symbols over the bounded worker pool
//! - `history`: list the current user's recent predictions
//! - `symbols` / `sectors`: browse the symbol catalogue
//! - `serve`: expose the prediction API over HTTP

mod server;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pricelab_core::data::catalogue;
use pricelab_core::domain::PredictionResult;
use pricelab_runner::api::{self, SymbolsQuery, ANONYMOUS_USER};
use pricelab_runner::{
    run_batch, BatchConfig, PredictResponse, PredictionService, ProviderKind, RunnerConfig,
};

const DEFAULT_CONFIG: &str = "pricelab.toml";

#[derive(Parser)]
#[command(
    name = "pricelab",
    about = "PriceLab CLI: next-day price predictions from daily history"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./pricelab.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured market-data provider.
    #[arg(long, global = true, value_enum)]
    provider: Option<ProviderArg>,

    /// User id recorded with each prediction.
    #[arg(long, global = true, default_value = ANONYMOUS_USER)]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Yahoo,
    Csv,
    Synthetic,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Yahoo => ProviderKind::Yahoo,
            ProviderArg::Csv => ProviderKind::Csv,
            ProviderArg::Synthetic => ProviderKind::Synthetic,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the next close of one symbol.
    Predict {
        /// Ticker symbol (e.g., AAPL, RELIANCE.NS).
        symbol: String,

        /// Strategy: SVM, DecisionTree, RandomForest, LSTM.
        #[arg(long)]
        model: Option<String>,

        /// Print the result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Predict several symbols concurrently.
    Batch {
        /// Ticker symbols.
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Strategy applied to every symbol.
        #[arg(long)]
        model: Option<String>,

        /// Worker threads. Defaults to batch.max_concurrency from config.
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Show the current user's recent predictions, newest first.
    History {
        /// Maximum records. Defaults to history.query_limit from config.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List catalogue symbols.
    Symbols {
        /// Case-insensitive search over symbol and company name.
        #[arg(long)]
        search: Option<String>,

        /// Restrict to one sector.
        #[arg(long)]
        sector: Option<String>,
    },
    /// List catalogue sectors with member counts.
    Sectors,
    /// Serve the HTTP API.
    Serve {
        /// Bind address. Defaults to server.bind from config.
        #[arg(long)]
        bind: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let load = || -> Result<RunnerConfig> {
        let mut config = load_config(cli.config.as_deref())?;
        if let Some(provider) = cli.provider {
            config.provider.kind = provider.into();
        }
        Ok(config)
    };

    match &cli.command {
        Commands::Predict {
            symbol,
            model,
            json,
        } => run_predict(&load()?, &cli.user, symbol, model.as_deref(), *json),
        Commands::Batch {
            symbols,
            model,
            concurrency,
        } => run_batch_cmd(&load()?, &cli.user, symbols, model.as_deref(), *concurrency),
        Commands::History { limit } => run_history(&load()?, &cli.user, *limit),
        Commands::Symbols { search, sector } => {
            run_symbols(SymbolsQuery {
                search: search.clone(),
                sector: sector.clone(),
            });
            Ok(())
        }
        Commands::Sectors => {
            run_sectors();
            Ok(())
        }
        Commands::Serve { bind } => run_serve(load()?, bind.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<RunnerConfig> {
    let config = match path {
        Some(path) => RunnerConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => {
            RunnerConfig::from_file(Path::new(DEFAULT_CONFIG))?
        }
        None => RunnerConfig::default(),
    };
    tracing::debug!(fingerprint = %config.fingerprint(), "configuration loaded");
    Ok(config)
}

fn build_service(config: &RunnerConfig) -> Result<PredictionService> {
    PredictionService::from_config(config).context("failed to set up prediction service")
}

fn run_predict(
    config: &RunnerConfig,
    user: &str,
    symbol: &str,
    model: Option<&str>,
    json: bool,
) -> Result<()> {
    let service = build_service(config)?;
    let result = service.predict(user, symbol, model)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&PredictResponse::from(&result))?
        );
    } else {
        print_prediction(&result);
    }
    Ok(())
}

fn run_batch_cmd(
    config: &RunnerConfig,
    user: &str,
    symbols: &[String],
    model: Option<&str>,
    concurrency: Option<usize>,
) -> Result<()> {
    let service = build_service(config)?;
    let mut batch = BatchConfig::from(&config.batch);
    if let Some(n) = concurrency {
        if n == 0 {
            bail!("--concurrency must be at least 1");
        }
        batch.max_concurrency = n;
    }

    let summary = run_batch(&service, user, symbols, model, &batch)?;

    println!(
        "{:<14} {:>12} {:>12} {:>9} {:>8}  {:<13} {}",
        "Symbol", "Current", "Predicted", "Change%", "Conf%", "Model", "Signal"
    );
    for item in &summary.items {
        match &item.outcome {
            Ok(r) => println!(
                "{:<14} {:>12.2} {:>12.2} {:>+9.2} {:>8.1}  {:<13} {}",
                r.symbol,
                r.current_price,
                r.predicted_price,
                r.price_change_percent,
                r.confidence,
                r.model_type.as_str(),
                r.recommendation.as_str()
            ),
            Err(e) => println!("{:<14} error: {e}", item.symbol),
        }
    }
    println!(
        "\n{} succeeded, {} failed in {:.1}s",
        summary.succeeded,
        summary.failed,
        summary.elapsed.as_secs_f64()
    );

    if summary.failed > 0 && summary.succeeded == 0 {
        bail!("every symbol in the batch failed");
    }
    Ok(())
}

fn run_history(config: &RunnerConfig, user: &str, limit: Option<usize>) -> Result<()> {
    let service = build_service(config)?;
    let records = service.history(user, limit)?;
    if records.is_empty() {
        println!("No predictions recorded for {user}.");
        return Ok(());
    }
    println!(
        "{:<20} {:<14} {:>12} {:>12} {:>9} {:>8}  {:<13} {}",
        "When (UTC)", "Symbol", "Current", "Predicted", "Change%", "Conf%", "Model", "Signal"
    );
    for r in &records {
        println!(
            "{:<20} {:<14} {:>12.2} {:>12.2} {:>+9.2} {:>8.1}  {:<13} {}",
            r.created_at.format(api::DATE_FORMAT),
            r.symbol,
            r.current_price,
            r.predicted_price,
            r.price_change_percent,
            r.confidence,
            r.model_type.as_str(),
            r.recommendation.as_str()
        );
    }
    Ok(())
}

fn run_symbols(query: SymbolsQuery) {
    let listed = api::symbols(&query);
    if listed.is_empty() {
        println!("No matching symbols.");
        return;
    }
    for info in &listed {
        println!("{:<14} {:<12} {}", info.symbol, info.sector, info.name);
    }
    println!("\n{} of {} symbols", listed.len(), catalogue::all().len());
}

fn run_sectors() {
    for sector in api::sectors() {
        println!("{:<12} {:>3}", sector.name, sector.count);
    }
}

fn run_serve(config: RunnerConfig, bind: Option<&str>) -> Result<()> {
    let addr = match bind {
        Some(bind) => bind
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address '{bind}'"))?,
        None => config.bind_addr()?,
    };
    // Built outside the async runtime: the Yahoo client is blocking.
    let service = Arc::new(build_service(&config)?);
    tracing::info!(provider = service.provider_name(), "starting server");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(Arc::clone(&service), addr))?;
    drop(runtime);
    Ok(())
}

fn print_prediction(result: &PredictionResult) {
    println!("=== {} ===", result.symbol);
    println!("Model:          {}", result.model_type);
    println!("Current price:  {:.2}", result.current_price);
    println!("Predicted:      {:.2}", result.predicted_price);
    println!("Change:         {:+.2}%", result.price_change_percent);
    println!("Confidence:     {:.1}%", result.confidence);
    println!("Recommendation: {}", result.recommendation);
    println!(
        "Generated:      {}",
        result.timestamp.format(api::DATE_FORMAT)
    );
}
