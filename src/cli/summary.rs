use super::ui;
use crate::core::valuation::{PortfolioSummary, valuate};
use crate::core::{PriceOracle, QuoteSnapshot};
use crate::store::PositionStore;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use rust_decimal::Decimal;
use std::collections::HashSet;

impl PortfolioSummary {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Asset"),
            ui::header_cell("Class"),
            ui::header_cell("Units"),
            ui::header_cell("Invested"),
            ui::header_cell("Current Value"),
            ui::header_cell("P&L"),
            ui::header_cell("Weight (%)"),
        ]);

        for position in &self.positions {
            let weight = if self.total_current_value > Decimal::ZERO {
                position.current_value / self.total_current_value
            } else {
                Decimal::ZERO
            };

            table.add_row(vec![
                Cell::new(&position.asset_id),
                Cell::new(position.asset_class.label()),
                ui::money_cell(position.quantity),
                ui::money_cell(position.invested),
                ui::money_cell(position.current_value),
                ui::signed_cell(position.pnl),
                ui::percentage_cell(weight),
            ]);
        }

        let mut output = format!(
            "Portfolio valuation as of {}\n\n",
            ui::style_text(&self.as_of.to_string(), ui::StyleType::Title)
        );

        output.push_str(&table.to_string());

        output.push_str(&format!(
            "\n\n{}: {}   {}: {}   {}: {}",
            ui::style_text("Invested", ui::StyleType::TotalLabel),
            format!("{:.2}", self.total_invested.round_dp(2)),
            ui::style_text("Current", ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.2}", self.total_current_value.round_dp(2)),
                ui::StyleType::TotalValue
            ),
            ui::style_text("P&L", ui::StyleType::TotalLabel),
            format!("{:.2}", self.total_pnl.round_dp(2)),
        ));

        for warning in &self.warnings {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(&format!("! {warning}"), ui::StyleType::Error)
            ));
        }

        output
    }
}

pub async fn run(
    store: &dyn PositionStore,
    oracle: &(dyn PriceOracle + Send + Sync),
    as_of: NaiveDate,
    json: bool,
) -> Result<()> {
    let summary = gather_and_valuate(store, oracle, as_of).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.positions.is_empty() {
        println!("No transactions recorded yet. Add one with `carteira add`.");
        return Ok(());
    }

    println!("{}", summary.display_as_table());
    Ok(())
}

/// Snapshots quotes with a progress bar, then runs the pure valuation fold.
pub async fn gather_and_valuate(
    store: &dyn PositionStore,
    oracle: &(dyn PriceOracle + Send + Sync),
    as_of: NaiveDate,
) -> Result<PortfolioSummary> {
    let transactions = store.list_transactions()?;

    let distinct_assets: HashSet<&str> =
        transactions.iter().map(|t| t.asset_id.as_str()).collect();
    let pb = ui::new_progress_bar(distinct_assets.len() as u64, true);
    pb.set_message("Fetching quotes...");

    let quotes = QuoteSnapshot::gather(oracle, &transactions, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    Ok(valuate(&transactions, &quotes, as_of))
}
