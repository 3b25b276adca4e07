//! Store inventory reconciliation.
//!
//! The warehouse keeps three kinds of records: store entries (what was
//! physically received against a completed purchase), store logs (what
//! workers took out and brought back), and the derived inventory view.
//! Available stock is never persisted; it is always recomputed from the
//! conservation identity
//!
//! ```text
//! available_stock = store_in_qty - total_taken + total_returned
//! ```
//!
//! Both the per-entry `available-stock` endpoint and the warehouse-wide
//! inventory listing go through this module, so the two surfaces cannot
//! disagree on the formula.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stock below this fraction of the received quantity is flagged low.
pub const LOW_STOCK_RATIO: Decimal = dec!(0.2);

/// Monetary-style quantities are kept to two decimal places.
pub const QTY_SCALE: u32 = 2;

/// Rounds a quantity to storage scale, halves away from zero.
/// Every stored quantity goes through this so 0.005 lands on 0.01.
pub fn round_qty(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QTY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    Low,
    Available,
}

/// One received line of a store entry, as seen by the reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedItem {
    pub item_name: String,
    pub unit: String,
    pub store_in_qty: Decimal,
}

/// A store entry reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryStock {
    pub store_entry_id: Uuid,
    pub items: Vec<ReceivedItem>,
}

/// One take/return line of a store log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementItem {
    pub item_name: String,
    pub taken_qty: Decimal,
    pub returned_qty: Decimal,
}

/// A store log reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogStock {
    pub store_entry_id: Uuid,
    pub items: Vec<MovementItem>,
}

/// Derived inventory line for one (store entry, item) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InventoryRow {
    pub store_entry_id: Uuid,
    pub item_name: String,
    pub unit: String,
    pub store_in_qty: Decimal,
    pub total_taken: Decimal,
    pub total_returned: Decimal,
    pub available_stock: Decimal,
    pub status: StockStatus,
}

/// Shortage/surplus split of an invoiced-vs-received pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Receipt {
    pub shortage: Decimal,
    pub surplus: Decimal,
}

/// Splits the difference between invoiced and physically received
/// quantities. At most one side is nonzero; both are rounded to two
/// decimal places before they are stored, so serialized state stays
/// stable across reloads.
pub fn reconcile_receipt(invoice_qty: Decimal, store_in_qty: Decimal) -> Receipt {
    let diff = invoice_qty - store_in_qty;
    Receipt {
        shortage: round_qty(diff.max(Decimal::ZERO)),
        surplus: round_qty((-diff).max(Decimal::ZERO)),
    }
}

/// Classifies available stock against the originally received quantity.
///
/// Out-of-stock wins over low regardless of the 20% threshold, and the
/// low comparison is strict: exactly 20% of the received quantity is
/// still `available`.
pub fn classify(available_stock: Decimal, store_in_qty: Decimal) -> StockStatus {
    if available_stock <= Decimal::ZERO {
        StockStatus::OutOfStock
    } else if available_stock < LOW_STOCK_RATIO * store_in_qty {
        StockStatus::Low
    } else {
        StockStatus::Available
    }
}

/// Reconciles a single store entry against every log that references it.
///
/// Emits exactly one row per item of the entry, in item order. Items no
/// log ever touched come out with zero taken/returned. Log items are
/// matched by exact name equality; names are free text upstream, so a
/// case or whitespace mismatch silently contributes nothing.
pub fn compute_entry_rows(entry: &EntryStock, logs: &[LogStock]) -> Vec<InventoryRow> {
    entry
        .items
        .iter()
        .map(|item| {
            let mut total_taken = Decimal::ZERO;
            let mut total_returned = Decimal::ZERO;

            for log in logs.iter().filter(|l| l.store_entry_id == entry.store_entry_id) {
                for movement in &log.items {
                    if movement.item_name == item.item_name {
                        total_taken += movement.taken_qty;
                        total_returned += movement.returned_qty;
                    }
                }
            }

            let available_stock = item.store_in_qty - total_taken + total_returned;

            InventoryRow {
                store_entry_id: entry.store_entry_id,
                item_name: item.item_name.clone(),
                unit: item.unit.clone(),
                store_in_qty: item.store_in_qty,
                total_taken,
                total_returned,
                available_stock,
                status: classify(available_stock, item.store_in_qty),
            }
        })
        .collect()
}

/// Reconciles the whole warehouse: one row per (entry, item) pair, in
/// entry-then-item order.
///
/// This is a defensive filter-join; logs referencing an unknown entry id
/// are ignored, and entries or logs with empty item lists contribute
/// nothing. Pure function of its two inputs.
pub fn compute_inventory(entries: &[EntryStock], logs: &[LogStock]) -> Vec<InventoryRow> {
    entries
        .iter()
        .flat_map(|entry| compute_entry_rows(entry, logs))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entry(id: Uuid, items: &[(&str, &str, Decimal)]) -> EntryStock {
        EntryStock {
            store_entry_id: id,
            items: items
                .iter()
                .map(|(name, unit, qty)| ReceivedItem {
                    item_name: (*name).to_string(),
                    unit: (*unit).to_string(),
                    store_in_qty: *qty,
                })
                .collect(),
        }
    }

    fn log(entry_id: Uuid, items: &[(&str, Decimal, Decimal)]) -> LogStock {
        LogStock {
            store_entry_id: entry_id,
            items: items
                .iter()
                .map(|(name, taken, returned)| MovementItem {
                    item_name: (*name).to_string(),
                    taken_qty: *taken,
                    returned_qty: *returned,
                })
                .collect(),
        }
    }

    #[rstest]
    #[case(dec!(50), dec!(45), dec!(5), dec!(0))]
    #[case(dec!(45), dec!(50), dec!(0), dec!(5))]
    #[case(dec!(50), dec!(50), dec!(0), dec!(0))]
    fn receipt_scenarios(
        #[case] invoice: Decimal,
        #[case] store_in: Decimal,
        #[case] shortage: Decimal,
        #[case] surplus: Decimal,
    ) {
        let receipt = reconcile_receipt(invoice, store_in);
        assert_eq!(receipt.shortage, shortage);
        assert_eq!(receipt.surplus, surplus);
    }

    #[test]
    fn receipt_sides_are_mutually_exclusive() {
        for (invoice, store_in) in [
            (dec!(10), dec!(3.5)),
            (dec!(3.5), dec!(10)),
            (dec!(0), dec!(0)),
            (dec!(99.99), dec!(100.01)),
        ] {
            let receipt = reconcile_receipt(invoice, store_in);
            assert!(
                receipt.shortage == Decimal::ZERO || receipt.surplus == Decimal::ZERO,
                "both sides nonzero for invoice={invoice} store_in={store_in}"
            );
        }
    }

    #[test]
    fn receipt_rounds_halves_away_from_zero() {
        let receipt = reconcile_receipt(dec!(10.005), dec!(10));
        assert_eq!(receipt.shortage, dec!(0.01));
        assert_eq!(receipt.surplus, dec!(0));

        let receipt = reconcile_receipt(dec!(10), dec!(10.005));
        assert_eq!(receipt.shortage, dec!(0));
        assert_eq!(receipt.surplus, dec!(0.01));
    }

    #[test]
    fn twenty_percent_boundary_is_strict() {
        // 20 out of 100 is exactly the threshold: not low.
        assert_eq!(classify(dec!(20), dec!(100)), StockStatus::Available);
        assert_eq!(classify(dec!(19), dec!(100)), StockStatus::Low);
    }

    #[test]
    fn out_of_stock_is_checked_before_low() {
        assert_eq!(classify(dec!(0), dec!(100)), StockStatus::OutOfStock);
        assert_eq!(classify(dec!(-5), dec!(100)), StockStatus::OutOfStock);
        // Zero received quantity: anything taken beyond it is out of stock,
        // never a negative-looking "low".
        assert_eq!(classify(dec!(-1), dec!(0)), StockStatus::OutOfStock);
    }

    #[test]
    fn take_and_return_scenario() {
        let id = Uuid::new_v4();
        let entries = vec![entry(id, &[("Poplin White", "m", dec!(100))])];
        let logs = vec![
            log(id, &[("Poplin White", dec!(30), dec!(0))]),
            log(id, &[("Poplin White", dec!(50), dec!(10))]),
        ];

        let rows = compute_inventory(&entries, &logs);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.total_taken, dec!(80));
        assert_eq!(row.total_returned, dec!(10));
        assert_eq!(row.available_stock, dec!(30));
        assert_eq!(row.status, StockStatus::Available);

        // One more worker takes 25: 100 - 105 + 10 = 5, below 20%.
        let mut logs = logs;
        logs.push(log(id, &[("Poplin White", dec!(25), dec!(0))]));
        let rows = compute_inventory(&entries, &logs);
        assert_eq!(rows[0].total_taken, dec!(105));
        assert_eq!(rows[0].available_stock, dec!(5));
        assert_eq!(rows[0].status, StockStatus::Low);
    }

    #[test]
    fn arithmetic_identity_holds_for_every_row() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let entries = vec![
            entry(a, &[("Fabric", "m", dec!(120.5)), ("Buttons 18L", "gross", dec!(40))]),
            entry(b, &[("Fabric", "m", dec!(10))]),
        ];
        let logs = vec![
            log(a, &[("Fabric", dec!(20.25), dec!(0.25)), ("Buttons 18L", dec!(40), dec!(2))]),
            log(b, &[("Fabric", dec!(3), dec!(1))]),
            // Unknown entry id: must be ignored by the filter-join.
            log(Uuid::new_v4(), &[("Fabric", dec!(999), dec!(0))]),
        ];

        let rows = compute_inventory(&entries, &logs);
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(
                row.available_stock,
                row.store_in_qty - row.total_taken + row.total_returned
            );
        }
    }

    #[test]
    fn items_absent_from_all_logs_get_zero_rows() {
        let id = Uuid::new_v4();
        let entries = vec![entry(id, &[("Zips", "pc", dec!(500))])];
        let rows = compute_inventory(&entries, &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_taken, dec!(0));
        assert_eq!(rows[0].total_returned, dec!(0));
        assert_eq!(rows[0].available_stock, dec!(500));
    }

    #[test]
    fn item_names_match_exactly_without_normalization() {
        let id = Uuid::new_v4();
        let entries = vec![entry(id, &[("Poplin", "m", dec!(50))])];
        let logs = vec![log(id, &[("poplin", dec!(10), dec!(0))])];

        // Case mismatch contributes nothing.
        let rows = compute_inventory(&entries, &logs);
        assert_eq!(rows[0].total_taken, dec!(0));
        assert_eq!(rows[0].available_stock, dec!(50));
    }

    #[test]
    fn output_preserves_entry_then_item_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let entries = vec![
            entry(a, &[("B-item", "pc", dec!(1)), ("A-item", "pc", dec!(1))]),
            entry(b, &[("C-item", "pc", dec!(1))]),
        ];
        let rows = compute_inventory(&entries, &[]);
        let names: Vec<_> = rows.iter().map(|r| r.item_name.as_str()).collect();
        assert_eq!(names, ["B-item", "A-item", "C-item"]);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let id = Uuid::new_v4();
        let entries = vec![entry(id, &[("Thread", "cone", dec!(60))])];
        let logs = vec![log(id, &[("Thread", dec!(12), dec!(2))])];

        let first = compute_inventory(&entries, &logs);
        let second = compute_inventory(&entries, &logs);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_item_lists_are_not_errors() {
        let id = Uuid::new_v4();
        let entries = vec![EntryStock { store_entry_id: id, items: vec![] }];
        let logs = vec![LogStock { store_entry_id: id, items: vec![] }];
        assert!(compute_inventory(&entries, &logs).is_empty());
    }
}
