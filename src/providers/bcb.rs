use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::cache::Cache;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// SGS series 432: the Selic target rate, in % p.a.
const SELIC_SERIES: u32 = 432;

const CACHE_KEY: &str = "selic";

/// Benchmark rate provider backed by the Banco Central do Brasil SGS API.
pub struct BcbRateProvider {
    base_url: String,
    cache: Arc<Cache<String, Decimal>>,
}

#[derive(Deserialize, Debug)]
struct SgsObservation {
    valor: String,
}

impl BcbRateProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, Decimal>>) -> Self {
        BcbRateProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }

    /// Latest published benchmark rate in % p.a. (e.g. 12.15).
    #[instrument(name = "BcbRateFetch", skip(self))]
    pub async fn fetch_annual_rate(&self) -> Result<Decimal> {
        if let Some(cached) = self.cache.get(&CACHE_KEY.to_string()).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/dados/serie/bcdata.sgs.{}/dados/ultimos/1?formato=json",
            self.base_url, SELIC_SERIES
        );
        debug!("Requesting benchmark rate from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("carteira/0.2")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        let observations = response
            .json::<Vec<SgsObservation>>()
            .await
            .context("Failed to parse SGS response")?;
        let latest = observations
            .last()
            .ok_or_else(|| anyhow!("SGS returned no observations"))?;

        let rate = Decimal::from_str(latest.valor.trim())
            .with_context(|| format!("Unparseable SGS rate: '{}'", latest.valor))?;

        self.cache.put(CACHE_KEY.to_string(), rate).await;

        Ok(rate)
    }
}
