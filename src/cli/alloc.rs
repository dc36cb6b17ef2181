use super::ui;
use crate::cli::summary::gather_and_valuate;
use crate::core::PriceOracle;
use crate::core::valuation::{PortfolioSummary, ValuationResult};
use crate::store::PositionStore;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use rust_decimal::Decimal;

pub async fn run(
    store: &dyn PositionStore,
    oracle: &(dyn PriceOracle + Send + Sync),
    as_of: NaiveDate,
) -> Result<()> {
    let summary = gather_and_valuate(store, oracle, as_of).await?;

    if summary.positions.is_empty() {
        println!("No transactions recorded yet. Add one with `carteira add`.");
        return Ok(());
    }

    display_allocation_table(&summary);
    Ok(())
}

fn display_allocation_table(summary: &PortfolioSummary) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Class"),
        ui::header_cell("Asset"),
        ui::header_cell("Value"),
        ui::header_cell("Allocation"),
    ]);

    // Largest class first.
    let mut classes: Vec<_> = summary.allocation_by_class.iter().collect();
    classes.sort_by(|(_, a), (_, b)| b.cmp(a));

    for (class, fraction) in classes {
        let mut positions: Vec<&ValuationResult> = summary
            .positions
            .iter()
            .filter(|p| p.asset_class == *class)
            .collect();
        positions.sort_by(|a, b| b.current_value.cmp(&a.current_value));

        let class_value: Decimal = positions.iter().map(|p| p.current_value).sum();

        table.add_row(vec![
            Cell::new(class.label()),
            Cell::new(""),
            ui::money_cell(class_value),
            ui::percentage_cell(*fraction),
        ]);

        for position in positions {
            let weight = if summary.total_current_value > Decimal::ZERO {
                position.current_value / summary.total_current_value
            } else {
                Decimal::ZERO
            };
            table.add_row(vec![
                Cell::new(""),
                Cell::new(&position.asset_id),
                Cell::new(ui::style_text(
                    &format!("{:.2}", position.current_value.round_dp(2)),
                    ui::StyleType::Subtle,
                )),
                ui::percentage_cell(weight),
            ]);
        }
    }

    println!(
        "\nAllocation as of {}\n",
        ui::style_text(&summary.as_of.to_string(), ui::StyleType::Title)
    );
    println!("{table}");
    println!(
        "\nTotal Value: {}\n",
        ui::style_text(
            &format!("{:.2}", summary.total_current_value.round_dp(2)),
            ui::StyleType::TotalValue
        )
    );

    for warning in &summary.warnings {
        println!(
            "{}",
            ui::style_text(&format!("! {warning}"), ui::StyleType::Error)
        );
    }

    ui::print_separator();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::AssetClass;
    use crate::core::transaction::Transaction;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    struct MockOracle;

    #[async_trait]
    impl PriceOracle for MockOracle {
        async fn current_price(&self, asset_id: &str) -> Option<Decimal> {
            match asset_id {
                "PETR4.SA" => Some(dec!(38.50)),
                "HGLG11.SA" => Some(dec!(155.10)),
                _ => None,
            }
        }

        async fn annual_accrual_rate(&self, _asset_id: &str) -> Option<Decimal> {
            Some(dec!(0.12))
        }
    }

    fn txn(asset_id: &str, class: AssetClass, quantity: Decimal, unit_price: Decimal) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            asset_id: asset_id.to_string(),
            asset_class: class,
            quantity,
            unit_price,
        }
    }

    #[tokio::test]
    async fn test_alloc_command() {
        let store = MemoryStore::new(vec![
            txn("PETR4.SA", AssetClass::Equity, dec!(100), dec!(30)),
            txn("HGLG11.SA", AssetClass::Fund, dec!(20), dec!(160)),
            txn("CDB Banco X", AssetClass::FixedIncome, dec!(1), dec!(5000)),
        ]);

        let as_of = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let result = run(&store, &MockOracle, as_of).await;
        assert!(result.is_ok());
    }
}
