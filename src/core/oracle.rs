//! Market-data abstractions and the pre-fold quote snapshot

use async_trait::async_trait;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::core::asset::AssetClass;
use crate::core::transaction::Transaction;

/// Source of current prices and contracted accrual rates.
///
/// Failure is represented as `None`, never an error: a dashboard with a stale
/// or missing quote is more useful than one that refuses to render.
/// Implementations are expected to enforce their own request timeouts.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Latest market price for one unit of the asset.
    async fn current_price(&self, asset_id: &str) -> Option<Decimal>;

    /// Contracted annual accrual rate as a fraction (0.10 = 10%/yr).
    async fn annual_accrual_rate(&self, asset_id: &str) -> Option<Decimal>;
}

/// All quotes needed to value a set of transactions, fetched up front so the
/// valuation fold itself stays pure and synchronous.
#[derive(Debug, Clone, Default)]
pub struct QuoteSnapshot {
    prices: HashMap<String, Decimal>,
    rates: HashMap<String, Decimal>,
}

enum Quote {
    Price(Decimal),
    Rate(Decimal),
}

impl QuoteSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, asset_id: &str, price: Decimal) -> Self {
        self.prices.insert(asset_id.to_string(), price);
        self
    }

    pub fn with_rate(mut self, asset_id: &str, rate: Decimal) -> Self {
        self.rates.insert(asset_id.to_string(), rate);
        self
    }

    pub fn price(&self, asset_id: &str) -> Option<Decimal> {
        self.prices.get(asset_id).copied()
    }

    pub fn rate(&self, asset_id: &str) -> Option<Decimal> {
        self.rates.get(asset_id).copied()
    }

    /// Fetches one quote per distinct asset id, concurrently. Market-priced
    /// classes get a price, accrual classes a rate; the first-seen class of an
    /// asset decides which, matching the grouping rule of the valuation fold.
    /// Unavailable quotes are simply absent from the snapshot.
    pub async fn gather(
        oracle: &(dyn PriceOracle + Send + Sync),
        transactions: &[Transaction],
        update_callback: &(dyn Fn() + Sync),
    ) -> Self {
        let mut kinds: HashMap<&str, AssetClass> = HashMap::new();
        for txn in transactions {
            kinds.entry(txn.asset_id.as_str()).or_insert(txn.asset_class);
        }

        let quote_futures = kinds.into_iter().map(|(asset_id, class)| async move {
            let quote = if class.is_market_priced() {
                oracle.current_price(asset_id).await.map(Quote::Price)
            } else {
                oracle.annual_accrual_rate(asset_id).await.map(Quote::Rate)
            };
            update_callback();
            (asset_id.to_string(), quote)
        });

        let mut snapshot = Self::new();
        for (asset_id, quote) in join_all(quote_futures).await {
            match quote {
                Some(Quote::Price(price)) => {
                    snapshot.prices.insert(asset_id, price);
                }
                Some(Quote::Rate(rate)) => {
                    snapshot.rates.insert(asset_id, rate);
                }
                None => {}
            }
        }
        snapshot
    }
}
