pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::asset::AssetClass;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::providers::bcb::BcbRateProvider;
use crate::providers::live::{BenchmarkSource, LiveOracle};
use crate::providers::yahoo::YahooQuoteProvider;
use crate::store::LedgerFile;

pub enum AppCommand {
    Summary {
        json: bool,
    },
    Alloc,
    Add {
        date: NaiveDate,
        asset_id: String,
        class: AssetClass,
        quantity: Decimal,
        unit_price: Decimal,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Carteira starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let ledger = LedgerFile::new(config.ledger_path()?);

    match command {
        AppCommand::Add {
            date,
            asset_id,
            class,
            quantity,
            unit_price,
        } => cli::add::run(&ledger, date, &asset_id, class, quantity, unit_price),
        AppCommand::Summary { json } => {
            let oracle = build_oracle(&config);
            let as_of = chrono::Local::now().date_naive();
            cli::summary::run(&ledger, &oracle, as_of, json).await
        }
        AppCommand::Alloc => {
            let oracle = build_oracle(&config);
            let as_of = chrono::Local::now().date_naive();
            cli::alloc::run(&ledger, &oracle, as_of).await
        }
    }
}

fn build_oracle(config: &AppConfig) -> LiveOracle {
    // Per-invocation quote caches shared across the provider calls
    let quote_cache = Arc::new(Cache::<String, Decimal>::new());
    let rate_cache = Arc::new(Cache::<String, Decimal>::new());

    let yahoo_base = config
        .providers
        .yahoo
        .as_ref()
        .map_or("https://query1.finance.yahoo.com", |p| &p.base_url);
    let quotes = YahooQuoteProvider::new(yahoo_base, Arc::clone(&quote_cache));

    let benchmark = match config.benchmark_rate {
        Some(rate) => BenchmarkSource::Fixed(rate),
        None => {
            let bcb_base = config
                .providers
                .bcb
                .as_ref()
                .map_or("https://api.bcb.gov.br", |p| &p.base_url);
            BenchmarkSource::Sgs(BcbRateProvider::new(bcb_base, Arc::clone(&rate_cache)))
        }
    };

    LiveOracle::new(quotes, benchmark, &config.assets)
}
