use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::core::config::AssetSpec;
use crate::core::oracle::PriceOracle;
use crate::providers::bcb::BcbRateProvider;
use crate::providers::yahoo::YahooQuoteProvider;

const HUNDRED: Decimal = dec!(100);

/// Where the fixed-income benchmark rate comes from: pinned in config, or the
/// latest published Selic.
pub enum BenchmarkSource {
    /// % p.a., as configured.
    Fixed(Decimal),
    Sgs(BcbRateProvider),
}

/// `PriceOracle` over live market data. Provider failures are logged and
/// reported as `None` so a feed outage degrades the valuation instead of
/// failing it.
pub struct LiveOracle {
    quotes: YahooQuoteProvider,
    benchmark: BenchmarkSource,
    registry: HashMap<String, AssetSpec>,
}

impl LiveOracle {
    pub fn new(
        quotes: YahooQuoteProvider,
        benchmark: BenchmarkSource,
        assets: &[AssetSpec],
    ) -> Self {
        let registry = assets
            .iter()
            .map(|spec| (spec.id.clone(), spec.clone()))
            .collect();
        LiveOracle {
            quotes,
            benchmark,
            registry,
        }
    }

    async fn benchmark_rate_pct(&self) -> Option<Decimal> {
        match &self.benchmark {
            BenchmarkSource::Fixed(rate) => Some(*rate),
            BenchmarkSource::Sgs(provider) => match provider.fetch_annual_rate().await {
                Ok(rate) => Some(rate),
                Err(e) => {
                    warn!(error = %e, "Benchmark rate fetch failed");
                    None
                }
            },
        }
    }
}

#[async_trait]
impl PriceOracle for LiveOracle {
    async fn current_price(&self, asset_id: &str) -> Option<Decimal> {
        let symbol = self
            .registry
            .get(asset_id)
            .and_then(|spec| spec.symbol.as_deref())
            .unwrap_or(asset_id);

        match self.quotes.fetch_quote(symbol).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(asset_id, symbol, error = %e, "Quote fetch failed, position will show at cost");
                None
            }
        }
    }

    async fn annual_accrual_rate(&self, asset_id: &str) -> Option<Decimal> {
        let benchmark_pct = self.benchmark_rate_pct().await?;
        let contracted_pct = self
            .registry
            .get(asset_id)
            .and_then(|spec| spec.benchmark_pct)
            .unwrap_or(HUNDRED);

        let rate = benchmark_pct / HUNDRED * contracted_pct / HUNDRED;
        debug!(asset_id, %benchmark_pct, %contracted_pct, %rate, "Resolved accrual rate");
        Some(rate)
    }
}
