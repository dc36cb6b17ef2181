use anyhow::Result;
use chrono::NaiveDate;
use console::style;
use rust_decimal::Decimal;

use crate::core::asset::AssetClass;
use crate::core::transaction::Transaction;
use crate::store::LedgerFile;

/// Validates and records a new ledger entry.
pub fn run(
    ledger: &LedgerFile,
    date: NaiveDate,
    asset_id: &str,
    class: AssetClass,
    quantity: Decimal,
    unit_price: Decimal,
) -> Result<()> {
    let transaction = Transaction {
        date,
        asset_id: asset_id.to_string(),
        asset_class: class,
        quantity,
        unit_price,
    };
    let notional = transaction.notional();

    ledger.append(transaction)?;

    println!(
        "{} {} {} x {:.2} ({}) on {}, notional {:.2}",
        style("Recorded:").green().bold(),
        quantity,
        asset_id,
        unit_price.round_dp(2),
        class,
        date,
        notional.round_dp(2),
    );
    Ok(())
}
