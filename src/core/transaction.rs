use anyhow::{Result, bail};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::asset::AssetClass;

/// One recorded ledger entry. Entries are append-only and never mutated;
/// positions are always recomputed from the full list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub asset_id: String,
    #[serde(rename = "class")]
    pub asset_class: AssetClass,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl Transaction {
    /// Capital committed by this entry.
    pub fn notional(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// Checks the ingestion invariants: positive quantity and unit price.
    pub fn validate(&self) -> Result<()> {
        if self.quantity <= Decimal::ZERO {
            bail!("quantity must be positive, got {}", self.quantity);
        }
        if self.unit_price <= Decimal::ZERO {
            bail!("unit price must be positive, got {}", self.unit_price);
        }
        Ok(())
    }
}
