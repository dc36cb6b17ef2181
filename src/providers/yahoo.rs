use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::cache::Cache;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Spot quote provider backed by the Yahoo Finance chart endpoint.
pub struct YahooQuoteProvider {
    base_url: String,
    cache: Arc<Cache<String, Decimal>>,
}

#[derive(Deserialize, Debug)]
struct YahooQuoteResponse {
    chart: QuoteChartResult,
}

#[derive(Deserialize, Debug)]
struct QuoteChartResult {
    result: Vec<QuoteChartItem>,
}

#[derive(Deserialize, Debug)]
struct QuoteChartItem {
    meta: QuoteChartMeta,
}

#[derive(Deserialize, Debug)]
struct QuoteChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

impl YahooQuoteProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, Decimal>>) -> Self {
        YahooQuoteProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }

    #[instrument(
        name = "YahooQuoteFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Decimal> {
        if let Some(cached) = self.cache.get(&symbol.to_string()).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url, symbol
        );
        debug!("Requesting quote from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("carteira/0.2")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        let data = response.json::<YahooQuoteResponse>().await?;
        let item = data
            .chart
            .result
            .first()
            .ok_or_else(|| anyhow!("No quote data found for symbol: {}", symbol))?;

        let price = Decimal::from_f64(item.meta.regular_market_price)
            .ok_or_else(|| anyhow!("Unrepresentable price for symbol: {}", symbol))?;

        self.cache.put(symbol.to_string(), price).await;

        Ok(price)
    }
}
