//! livelo-intel: Livelo loyalty-offer dashboard.
//!
//! Single-binary Tokio application that:
//! 1. Resolves service-account credentials from secrets
//! 2. Loads the offer worksheet from Google Sheets (cached)
//! 3. Derives the current offer per store
//! 4. Filters and summarizes it for the terminal

mod config;
mod render;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use common::{AppConfig, Error, SnapshotPolicy};
use offers::{
    build_series, calculate, default_selection, CachedLoader, CalculatorInput, FilterCriteria,
    OfferEngine, ParseOptions,
};
use sheets_client::{resolve_credentials, ServiceAccountAuth, SheetsRestClient};

/// Livelo Market Intelligence
#[derive(Parser)]
#[command(name = "livelo-intel", about = "Livelo point-offer dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Current offers as cards, with headline metrics.
    Offers {
        /// Minimum points per R$ (inclusive).
        #[arg(long, value_parser = config::parse_threshold_arg)]
        min: Option<f64>,
        /// Case-insensitive store-name search.
        #[arg(long)]
        search: Option<String>,
        /// latest-per-store or latest-global-timestamp.
        #[arg(long)]
        policy: Option<SnapshotPolicy>,
        #[arg(long)]
        json: bool,
        /// Re-render every N seconds, reusing the cached sheet until it expires.
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
    /// Point-value history per store.
    History {
        /// Store to plot; repeat for several. Defaults to the first two.
        #[arg(long = "store")]
        stores: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Profit calculator. Needs no spreadsheet access.
    Calc {
        /// Purchase amount in R$.
        #[arg(long, value_parser = config::parse_threshold_arg)]
        purchase: f64,
        /// Points per R$.
        #[arg(long, value_parser = config::parse_threshold_arg)]
        rate: Option<f64>,
        /// R$ per milheiro.
        #[arg(long, value_parser = config::parse_threshold_arg)]
        sell_price: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Resolve credentials, authenticate, and print the first worksheet name.
    CheckAuth,
}

fn connect(cfg: &AppConfig) -> Result<SheetsRestClient, Error> {
    let resolved = resolve_credentials(&cfg.secrets, &cfg.spreadsheet_url)?;
    let auth = Arc::new(ServiceAccountAuth::new(&resolved.key)?);
    SheetsRestClient::new(auth, resolved.spreadsheet, &cfg.sheets)
}

fn build_loader(cfg: &AppConfig) -> Result<CachedLoader<SheetsRestClient>, Error> {
    let client = connect(cfg)?;
    Ok(CachedLoader::new(
        client,
        ParseOptions {
            invalid_value: cfg.parsing.invalid_value,
        },
        Duration::from_secs(cfg.cache.ttl_secs),
    ))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli, cfg: AppConfig) -> Result<(), Error> {
    match cli.command {
        Command::Calc {
            purchase,
            rate,
            sell_price,
            json,
        } => {
            let input = CalculatorInput {
                purchase,
                rate: rate.unwrap_or(cfg.calculator.default_rate),
                sell_price: sell_price.unwrap_or(cfg.calculator.sell_price),
            };
            let result = calculate(input)?;
            if json {
                print_json(&result)?;
            } else {
                print!("{}", render::render_calc(&input, &result)?);
            }
        }

        Command::CheckAuth => {
            let client = connect(&cfg)?;
            let title = client.first_sheet_title().await?;
            info!("Authenticated against spreadsheet {}", client.spreadsheet().id);
            println!("OK: first worksheet is '{title}'");
        }

        Command::Offers {
            min,
            search,
            policy,
            json,
            watch,
        } => {
            let mut loader = build_loader(&cfg).map_err(unavailable)?;
            let criteria = FilterCriteria::new(
                min.unwrap_or(cfg.filters.min_value),
                search.or_else(|| cfg.filters.search.clone()),
            );
            let engine = OfferEngine::new(policy.unwrap_or(cfg.policy), criteria);

            loop {
                match loader.load().await {
                    Ok(history) => {
                        let view = engine.evaluate(&history);
                        if json {
                            print_json(&view)?;
                        } else {
                            print!("{}", render::render_offers(&view, history.fetched_at)?);
                        }
                    }
                    // A failed refresh in watch mode just waits for the next tick.
                    Err(e) if watch.is_some() => {
                        unavailable(e.0);
                    }
                    Err(e) => return Err(unavailable(e.0)),
                }

                let Some(secs) = watch else { break };
                tokio::time::sleep(Duration::from_secs(secs.max(1))).await;
            }
        }

        Command::History { stores, json } => {
            let mut loader = build_loader(&cfg).map_err(unavailable)?;
            let history = loader.load().await.map_err(|e| unavailable(e.0))?;

            let selection = if stores.is_empty() {
                default_selection(&history)
            } else {
                stores
            };
            let series = build_series(&history, &selection);

            if json {
                print_json(&series)?;
            } else {
                print!("{}", render::render_history(&series)?);
            }
        }
    }
    Ok(())
}

/// Report a failed load as the "data unavailable" state.
fn unavailable(e: Error) -> Error {
    warn!("Dados indisponíveis: aguardando carregamento dos dados...");
    e
}

#[tokio::main]
async fn main() {
    // Initialize logging. Logs go to stderr; stdout carries the views.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "livelo_intel=info,sheets_client=info,offers=info".into()
            }),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Config loaded: policy={} min_value={} cache_ttl={}s",
        cfg.policy, cfg.filters.min_value, cfg.cache.ttl_secs
    );

    if let Err(e) = run(cli, cfg).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
