use anyhow::{Context, Result};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::asset::AssetClass;

/// Registry entry for an asset the ledger refers to. The ledger rows carry the
/// class themselves; the registry adds provider metadata.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetSpec {
    pub id: String,
    pub class: AssetClass,
    /// Quote symbol when it differs from the asset id (e.g. "PETR4.SA").
    pub symbol: Option<String>,
    /// Contracted percentage of the benchmark rate, e.g. 110 for 110% of CDI.
    /// Defaults to 100.
    pub benchmark_pct: Option<Decimal>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BcbProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
    pub bcb: Option<BcbProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
            bcb: Some(BcbProviderConfig {
                base_url: "https://api.bcb.gov.br".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub assets: Vec<AssetSpec>,
    /// Ledger file location; defaults to `ledger.yaml` under the data dir.
    pub ledger: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Fixed benchmark rate in % p.a.; skips the BCB fetch when set.
    pub benchmark_rate: Option<Decimal>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "brunoclp", "carteira")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn ledger_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.ledger {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "brunoclp", "carteira")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("ledger.yaml"))
    }

    pub fn asset_spec(&self, asset_id: &str) -> Option<&AssetSpec> {
        self.assets.iter().find(|a| a.id == asset_id)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
