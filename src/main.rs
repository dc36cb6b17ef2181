use anyhow::Result;
use carteira::core::log::init_logging;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for carteira::AppCommand {
    fn from(cmd: Commands) -> carteira::AppCommand {
        match cmd {
            Commands::Summary { json } => carteira::AppCommand::Summary { json },
            Commands::Alloc => carteira::AppCommand::Alloc,
            Commands::Add {
                asset_id,
                class,
                quantity,
                unit_price,
                date,
            } => carteira::AppCommand::Add {
                date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                asset_id,
                class,
                quantity,
                unit_price,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record a transaction in the ledger
    Add {
        /// Asset identifier, e.g. "PETR4.SA" or "CDB Banco X"
        asset_id: String,
        /// Asset class: equity, fund, crypto or fixed_income
        class: carteira::core::AssetClass,
        /// Number of units bought
        quantity: Decimal,
        /// Price paid per unit
        unit_price: Decimal,
        /// Transaction date (YYYY-MM-DD); defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Display portfolio valuation
    Summary {
        /// Emit the summary as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Display allocation by asset class
    Alloc,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => carteira::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = carteira::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
# Assets the ledger refers to. Classes: equity, fund, crypto, fixed_income.
assets: []
# - id: "PETR4"
#   class: equity
#   symbol: "PETR4.SA"
# - id: "CDB Banco X"
#   class: fixed_income
#   benchmark_pct: 110

providers:
  yahoo:
    base_url: "https://query1.finance.yahoo.com"
  bcb:
    base_url: "https://api.bcb.gov.br"

# Pin the fixed-income benchmark (% p.a.) instead of fetching Selic:
# benchmark_rate: 12.15
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
