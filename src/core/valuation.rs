//! Folds ledger transactions into per-asset valuations and portfolio totals.

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::warn;

use crate::core::asset::AssetClass;
use crate::core::oracle::QuoteSnapshot;
use crate::core::transaction::Transaction;

const DAYS_PER_YEAR: Decimal = dec!(365);

/// Valuation of a single position (all transactions sharing one asset id).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
    pub asset_id: String,
    pub asset_class: AssetClass,
    pub quantity: Decimal,
    /// Exact sum of notionals, independent of quote availability.
    pub invested: Decimal,
    /// Best effort: equals `invested` when no quote or rate was available.
    pub current_value: Decimal,
    pub pnl: Decimal,
}

/// Non-fatal data-quality findings collected during a valuation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValuationWarning {
    /// Entry violated the ledger invariants and was skipped.
    InvalidTransaction { asset_id: String, reason: String },
    /// Same asset id recorded under two classes; the first one wins.
    InconsistentAssetClass {
        asset_id: String,
        kept: AssetClass,
        seen: AssetClass,
    },
    /// No price or rate available; the position degraded to its cost basis.
    QuoteUnavailable { asset_id: String },
}

impl Display for ValuationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValuationWarning::InvalidTransaction { asset_id, reason } => {
                write!(f, "{asset_id}: skipped invalid entry ({reason})")
            }
            ValuationWarning::InconsistentAssetClass {
                asset_id,
                kept,
                seen,
            } => {
                write!(f, "{asset_id}: recorded as {seen} but already {kept}; keeping {kept}")
            }
            ValuationWarning::QuoteUnavailable { asset_id } => {
                write!(f, "{asset_id}: no quote available, shown at cost")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub as_of: NaiveDate,
    pub positions: Vec<ValuationResult>,
    pub total_invested: Decimal,
    pub total_current_value: Decimal,
    pub total_pnl: Decimal,
    /// Fraction of total current value per class, in `[0, 1]`. Empty for an
    /// empty portfolio; all zeros when the total current value is zero.
    pub allocation_by_class: BTreeMap<AssetClass, Decimal>,
    pub warnings: Vec<ValuationWarning>,
}

struct PositionAccum {
    asset_class: AssetClass,
    quantity: Decimal,
    invested: Decimal,
    /// Entry date and notional of each leg; fixed income accrues these
    /// independently since legs entered on different dates accrue for
    /// different durations.
    legs: Vec<(NaiveDate, Decimal)>,
}

/// Values every position in `transactions` against the quotes in `quotes`.
///
/// Pure and stateless: identical inputs produce identical output, positions
/// are emitted sorted by asset id, and no failure of the quote layer can
/// surface here — missing quotes degrade the affected position to its cost
/// basis with a warning.
pub fn valuate(
    transactions: &[Transaction],
    quotes: &QuoteSnapshot,
    as_of: NaiveDate,
) -> PortfolioSummary {
    let mut warnings = Vec::new();
    let mut accums: BTreeMap<String, PositionAccum> = BTreeMap::new();

    for txn in transactions {
        if let Err(reason) = txn.validate() {
            warn!(asset_id = %txn.asset_id, %reason, "Skipping malformed ledger entry");
            warnings.push(ValuationWarning::InvalidTransaction {
                asset_id: txn.asset_id.clone(),
                reason: reason.to_string(),
            });
            continue;
        }

        let accum = accums
            .entry(txn.asset_id.clone())
            .or_insert_with(|| PositionAccum {
                asset_class: txn.asset_class,
                quantity: Decimal::ZERO,
                invested: Decimal::ZERO,
                legs: Vec::new(),
            });

        if accum.asset_class != txn.asset_class {
            warn!(
                asset_id = %txn.asset_id,
                kept = %accum.asset_class,
                seen = %txn.asset_class,
                "Inconsistent asset class in ledger"
            );
            warnings.push(ValuationWarning::InconsistentAssetClass {
                asset_id: txn.asset_id.clone(),
                kept: accum.asset_class,
                seen: txn.asset_class,
            });
        }

        accum.quantity += txn.quantity;
        accum.invested += txn.notional();
        accum.legs.push((txn.date, txn.notional()));
    }

    let mut positions = Vec::with_capacity(accums.len());
    for (asset_id, accum) in accums {
        let current_value = if accum.asset_class.is_market_priced() {
            match quotes.price(&asset_id) {
                Some(price) => accum.quantity * price,
                None => {
                    warnings.push(ValuationWarning::QuoteUnavailable {
                        asset_id: asset_id.clone(),
                    });
                    accum.invested
                }
            }
        } else {
            match quotes.rate(&asset_id) {
                Some(rate) => accum
                    .legs
                    .iter()
                    .map(|(date, notional)| accrued_value(*notional, rate, *date, as_of))
                    .sum(),
                None => {
                    warnings.push(ValuationWarning::QuoteUnavailable {
                        asset_id: asset_id.clone(),
                    });
                    accum.invested
                }
            }
        };

        positions.push(ValuationResult {
            asset_id,
            asset_class: accum.asset_class,
            quantity: accum.quantity,
            invested: accum.invested,
            pnl: current_value - accum.invested,
            current_value,
        });
    }

    let total_invested: Decimal = positions.iter().map(|p| p.invested).sum();
    let total_current_value: Decimal = positions.iter().map(|p| p.current_value).sum();

    let mut allocation_by_class: BTreeMap<AssetClass, Decimal> = BTreeMap::new();
    for position in &positions {
        *allocation_by_class
            .entry(position.asset_class)
            .or_insert(Decimal::ZERO) += position.current_value;
    }
    if total_current_value > Decimal::ZERO {
        for value in allocation_by_class.values_mut() {
            *value /= total_current_value;
        }
    } else {
        for value in allocation_by_class.values_mut() {
            *value = Decimal::ZERO;
        }
    }

    PortfolioSummary {
        as_of,
        total_pnl: total_current_value - total_invested,
        total_invested,
        total_current_value,
        allocation_by_class,
        warnings,
        positions,
    }
}

/// Compound accrual of one leg on an ACT/365 day count. Elapsed time clamps
/// at zero so an `as_of` before the entry date never discounts the notional.
fn accrued_value(notional: Decimal, rate: Decimal, entry_date: NaiveDate, as_of: NaiveDate) -> Decimal {
    let days = (as_of - entry_date).num_days().max(0);
    let elapsed_years = Decimal::from(days) / DAYS_PER_YEAR;
    notional * (Decimal::ONE + rate).powd(elapsed_years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const EPSILON: Decimal = dec!(0.000000001);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(
        asset_id: &str,
        class: AssetClass,
        entry: NaiveDate,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Transaction {
        Transaction {
            date: entry,
            asset_id: asset_id.to_string(),
            asset_class: class,
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_empty_input_yields_zero_totals_and_empty_allocation() {
        let summary = valuate(&[], &QuoteSnapshot::new(), date(2025, 1, 1));

        assert!(summary.positions.is_empty());
        assert_eq!(summary.total_invested, Decimal::ZERO);
        assert_eq!(summary.total_current_value, Decimal::ZERO);
        assert_eq!(summary.total_pnl, Decimal::ZERO);
        assert!(summary.allocation_by_class.is_empty());
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_mark_to_market_position() {
        let transactions = vec![
            txn("PETR4.SA", AssetClass::Equity, date(2024, 1, 10), dec!(100), dec!(30)),
            txn("PETR4.SA", AssetClass::Equity, date(2024, 6, 10), dec!(50), dec!(36)),
        ];
        let quotes = QuoteSnapshot::new().with_price("PETR4.SA", dec!(40));

        let summary = valuate(&transactions, &quotes, date(2025, 1, 1));

        assert_eq!(summary.positions.len(), 1);
        let position = &summary.positions[0];
        assert_eq!(position.quantity, dec!(150));
        assert_eq!(position.invested, dec!(4800));
        assert_eq!(position.current_value, dec!(6000));
        assert_eq!(position.pnl, dec!(1200));
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_price_unavailable_falls_back_to_cost() {
        let transactions = vec![txn(
            "VALE3.SA",
            AssetClass::Equity,
            date(2024, 3, 1),
            dec!(10),
            dec!(50),
        )];

        let summary = valuate(&transactions, &QuoteSnapshot::new(), date(2025, 1, 1));

        let position = &summary.positions[0];
        assert_eq!(position.invested, dec!(500));
        assert_eq!(position.current_value, dec!(500));
        assert_eq!(position.pnl, Decimal::ZERO);
        assert_eq!(
            summary.warnings,
            vec![ValuationWarning::QuoteUnavailable {
                asset_id: "VALE3.SA".to_string()
            }]
        );
    }

    #[test]
    fn test_accrual_one_year_at_ten_percent() {
        let entry = date(2024, 1, 1);
        let as_of = entry + chrono::Duration::days(365);
        let transactions = vec![txn(
            "CDB Banco X",
            AssetClass::FixedIncome,
            entry,
            dec!(1),
            dec!(1000),
        )];
        let quotes = QuoteSnapshot::new().with_rate("CDB Banco X", dec!(0.10));

        let summary = valuate(&transactions, &quotes, as_of);

        let position = &summary.positions[0];
        assert!((position.current_value - dec!(1100.00)).abs() < EPSILON);
        assert!((position.pnl - dec!(100.00)).abs() < EPSILON);
    }

    #[test]
    fn test_accrual_clamps_future_dated_entries() {
        let transactions = vec![txn(
            "CDB Banco X",
            AssetClass::FixedIncome,
            date(2025, 6, 1),
            dec!(1),
            dec!(1000),
        )];
        let quotes = QuoteSnapshot::new().with_rate("CDB Banco X", dec!(0.10));

        // as_of before the entry date: zero elapsed time, not negative accrual.
        let summary = valuate(&transactions, &quotes, date(2025, 1, 1));

        assert_eq!(summary.positions[0].current_value, dec!(1000));
        assert_eq!(summary.positions[0].pnl, Decimal::ZERO);
    }

    #[test]
    fn test_multi_date_legs_accrue_independently() {
        let as_of = date(2025, 3, 1);
        let old_leg = as_of - chrono::Duration::days(400);
        let new_leg = as_of - chrono::Duration::days(100);
        let rate = dec!(0.08);
        let transactions = vec![
            txn("CDB Banco X", AssetClass::FixedIncome, old_leg, dec!(1), dec!(1000)),
            txn("CDB Banco X", AssetClass::FixedIncome, new_leg, dec!(1), dec!(2000)),
        ];
        let quotes = QuoteSnapshot::new().with_rate("CDB Banco X", rate);

        let summary = valuate(&transactions, &quotes, as_of);

        let growth = Decimal::ONE + rate;
        let expected = dec!(1000) * growth.powd(dec!(400) / dec!(365))
            + dec!(2000) * growth.powd(dec!(100) / dec!(365));
        let pooled = dec!(3000) * growth.powd(dec!(250) / dec!(365));

        let position = &summary.positions[0];
        assert!((position.current_value - expected).abs() < EPSILON);
        assert!((position.current_value - pooled).abs() > dec!(0.01));
        assert!(position.pnl > Decimal::ZERO);
    }

    #[test]
    fn test_rate_unavailable_falls_back_to_cost() {
        let transactions = vec![txn(
            "CDB Banco X",
            AssetClass::FixedIncome,
            date(2024, 1, 1),
            dec!(1),
            dec!(1000),
        )];

        let summary = valuate(&transactions, &QuoteSnapshot::new(), date(2025, 1, 1));

        assert_eq!(summary.positions[0].current_value, dec!(1000));
        assert_eq!(summary.positions[0].pnl, Decimal::ZERO);
        assert_eq!(summary.warnings.len(), 1);
    }

    #[test]
    fn test_invested_is_exact_sum_of_notionals() {
        let transactions = vec![
            txn("A", AssetClass::Equity, date(2024, 1, 1), dec!(3.333), dec!(10.01)),
            txn("A", AssetClass::Equity, date(2024, 2, 1), dec!(6.667), dec!(9.99)),
            txn("B", AssetClass::FixedIncome, date(2024, 3, 1), dec!(1), dec!(1234.56)),
        ];

        let summary = valuate(&transactions, &QuoteSnapshot::new(), date(2025, 1, 1));

        let expected: Decimal = transactions.iter().map(Transaction::notional).sum();
        let total: Decimal = summary.positions.iter().map(|p| p.invested).sum();
        assert_eq!(total, expected);
        assert_eq!(summary.total_invested, expected);
    }

    #[test]
    fn test_allocation_fractions_sum_to_one() {
        let transactions = vec![
            txn("PETR4.SA", AssetClass::Equity, date(2024, 1, 1), dec!(100), dec!(30)),
            txn("HGLG11.SA", AssetClass::Fund, date(2024, 1, 1), dec!(20), dec!(160)),
            txn("CDB Banco X", AssetClass::FixedIncome, date(2024, 1, 1), dec!(1), dec!(5000)),
        ];
        let quotes = QuoteSnapshot::new()
            .with_price("PETR4.SA", dec!(38.50))
            .with_price("HGLG11.SA", dec!(155.10))
            .with_rate("CDB Banco X", dec!(0.12));

        let summary = valuate(&transactions, &quotes, date(2025, 1, 1));

        assert!(summary.total_current_value > Decimal::ZERO);
        let sum: Decimal = summary.allocation_by_class.values().copied().sum();
        assert!((sum - Decimal::ONE).abs() <= EPSILON);
        for fraction in summary.allocation_by_class.values() {
            assert!(*fraction >= Decimal::ZERO && *fraction <= Decimal::ONE);
        }
    }

    #[test]
    fn test_allocation_is_zero_when_current_value_is_zero() {
        let transactions = vec![txn(
            "WORTHLESS",
            AssetClass::Equity,
            date(2024, 1, 1),
            dec!(10),
            dec!(5),
        )];
        let quotes = QuoteSnapshot::new().with_price("WORTHLESS", dec!(0));

        let summary = valuate(&transactions, &quotes, date(2025, 1, 1));

        assert_eq!(summary.total_current_value, Decimal::ZERO);
        assert_eq!(
            summary.allocation_by_class.get(&AssetClass::Equity),
            Some(&Decimal::ZERO)
        );
    }

    #[test]
    fn test_idempotence_with_deterministic_quotes() {
        let transactions = vec![
            txn("PETR4.SA", AssetClass::Equity, date(2024, 1, 1), dec!(100), dec!(30)),
            txn("CDB Banco X", AssetClass::FixedIncome, date(2024, 1, 1), dec!(1), dec!(5000)),
        ];
        let quotes = QuoteSnapshot::new()
            .with_price("PETR4.SA", dec!(38.50))
            .with_rate("CDB Banco X", dec!(0.12));
        let as_of = date(2025, 1, 1);

        let first = valuate(&transactions, &quotes, as_of);
        let second = valuate(&transactions, &quotes, as_of);
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_entry_is_skipped_not_fatal() {
        let transactions = vec![
            txn("PETR4.SA", AssetClass::Equity, date(2024, 1, 1), dec!(100), dec!(30)),
            txn("PETR4.SA", AssetClass::Equity, date(2024, 2, 1), dec!(-5), dec!(30)),
        ];
        let quotes = QuoteSnapshot::new().with_price("PETR4.SA", dec!(40));

        let summary = valuate(&transactions, &quotes, date(2025, 1, 1));

        // Only the valid entry contributes.
        assert_eq!(summary.positions[0].quantity, dec!(100));
        assert_eq!(summary.positions[0].invested, dec!(3000));
        assert!(matches!(
            summary.warnings[0],
            ValuationWarning::InvalidTransaction { .. }
        ));
    }

    #[test]
    fn test_inconsistent_class_first_seen_wins() {
        let transactions = vec![
            txn("MIXED", AssetClass::Equity, date(2024, 1, 1), dec!(10), dec!(10)),
            txn("MIXED", AssetClass::Fund, date(2024, 2, 1), dec!(10), dec!(10)),
        ];
        let quotes = QuoteSnapshot::new().with_price("MIXED", dec!(12));

        let summary = valuate(&transactions, &quotes, date(2025, 1, 1));

        assert_eq!(summary.positions[0].asset_class, AssetClass::Equity);
        assert_eq!(summary.positions[0].quantity, dec!(20));
        assert_eq!(
            summary.warnings,
            vec![ValuationWarning::InconsistentAssetClass {
                asset_id: "MIXED".to_string(),
                kept: AssetClass::Equity,
                seen: AssetClass::Fund,
            }]
        );
    }

    #[test]
    fn test_positions_sorted_by_asset_id() {
        let transactions = vec![
            txn("ZZZ", AssetClass::Equity, date(2024, 1, 1), dec!(1), dec!(1)),
            txn("AAA", AssetClass::Equity, date(2024, 1, 1), dec!(1), dec!(1)),
        ];

        let summary = valuate(&transactions, &QuoteSnapshot::new(), date(2025, 1, 1));

        let ids: Vec<_> = summary.positions.iter().map(|p| p.asset_id.as_str()).collect();
        assert_eq!(ids, vec!["AAA", "ZZZ"]);
    }

    #[test]
    fn test_summary_serializes_expected_keys() {
        let transactions = vec![txn(
            "PETR4.SA",
            AssetClass::Equity,
            date(2024, 1, 1),
            dec!(10),
            dec!(30),
        )];
        let quotes = QuoteSnapshot::new().with_price("PETR4.SA", dec!(33));

        let summary = valuate(&transactions, &quotes, date(2025, 1, 1));
        let json = serde_json::to_value(&summary).unwrap();

        assert!(json.get("total_invested").is_some());
        assert!(json.get("total_current_value").is_some());
        assert!(json.get("total_pnl").is_some());
        assert!(json["allocation_by_class"].get("equity").is_some());
    }
}
