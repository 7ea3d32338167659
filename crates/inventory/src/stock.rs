//! Stock summaries derived from inventory lines.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_core::VendorId;

use crate::item::InventoryItem;

/// A lot: every inventory line sharing a lot number and vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub lot_number: String,
    pub vendor_id: VendorId,
    pub items: Vec<InventoryItem>,
}

impl Lot {
    pub fn total_meters(&self) -> Decimal {
        self.items.iter().map(|i| i.meters).sum()
    }

    pub fn total_value(&self) -> Decimal {
        self.items.iter().map(InventoryItem::total_value).sum()
    }

    /// A lot is billed once every line in it is billed.
    pub fn is_billed(&self) -> bool {
        self.items.iter().all(|i| i.is_billed)
    }
}

/// Group lines into lots, ordered by lot number then vendor.
pub fn group_lots(items: &[InventoryItem]) -> Vec<Lot> {
    let mut lots: BTreeMap<(String, VendorId), Vec<InventoryItem>> = BTreeMap::new();
    for item in items {
        lots.entry((item.lot_number.clone(), item.vendor_id))
            .or_default()
            .push(item.clone());
    }
    lots.into_iter()
        .map(|((lot_number, vendor_id), items)| Lot {
            lot_number,
            vendor_id,
            items,
        })
        .collect()
}

/// Totals across all inventory lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_meters: Decimal,
    pub unbilled_items: usize,
}

pub fn summarize(items: &[InventoryItem]) -> InventorySummary {
    InventorySummary {
        total_items: items.len(),
        total_meters: items.iter().map(|i| i.meters).sum(),
        unbilled_items: items.iter().filter(|i| !i.is_billed).count(),
    }
}

/// Per-vendor stock totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorStock {
    pub vendor_id: VendorId,
    pub item_count: usize,
    pub total_meters: Decimal,
}

/// Vendors that have at least one line, ordered by vendor id.
pub fn summarize_by_vendor(items: &[InventoryItem]) -> Vec<VendorStock> {
    let mut by_vendor: BTreeMap<VendorId, VendorStock> = BTreeMap::new();
    for item in items {
        let entry = by_vendor.entry(item.vendor_id).or_insert(VendorStock {
            vendor_id: item.vendor_id,
            item_count: 0,
            total_meters: Decimal::ZERO,
        });
        entry.item_count += 1;
        entry.total_meters += item.meters;
    }
    by_vendor.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use textileflow_core::InventoryItemId;

    fn line(id: i64, lot: &str, vendor: i64, meters: Decimal, billed: bool) -> InventoryItem {
        InventoryItem {
            id: InventoryItemId::new(id),
            lot_number: lot.into(),
            fabric_type: format!("fabric-{id}"),
            meters,
            unit_price: dec!(100),
            vendor_id: VendorId::new(vendor),
            received_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_billed: billed,
        }
    }

    #[test]
    fn lines_with_same_lot_and_vendor_form_one_lot() {
        let items = vec![
            line(1, "LOT-1022", 1, dec!(200), true),
            line(2, "LOT-1021", 1, dec!(450), true),
            line(3, "LOT-1021", 1, dec!(50), false),
            line(4, "LOT-1021", 2, dec!(10), false),
        ];
        let lots = group_lots(&items);
        assert_eq!(lots.len(), 3);
        assert_eq!(lots[0].lot_number, "LOT-1021");
        assert_eq!(lots[0].vendor_id, VendorId::new(1));
        assert_eq!(lots[0].total_meters(), dec!(500));
        assert!(!lots[0].is_billed());
        assert!(lots[2].is_billed());
    }

    #[test]
    fn summary_counts_unbilled_lines() {
        let items = vec![
            line(1, "A", 1, dec!(85), true),
            line(2, "B", 2, dec!(15.5), false),
        ];
        let s = summarize(&items);
        assert_eq!(s.total_items, 2);
        assert_eq!(s.total_meters, dec!(100.5));
        assert_eq!(s.unbilled_items, 1);

        let by_vendor = summarize_by_vendor(&items);
        assert_eq!(by_vendor.len(), 2);
        assert_eq!(by_vendor[1].total_meters, dec!(15.5));
    }

    proptest! {
        #[test]
        fn lots_partition_all_meters(meters in proptest::collection::vec(1i64..100_000, 0..30)) {
            let items: Vec<_> = meters
                .iter()
                .enumerate()
                .map(|(i, m)| line(i as i64 + 1, if i % 3 == 0 { "X" } else { "Y" }, (i % 2) as i64 + 1, Decimal::new(*m, 2), false))
                .collect();
            let from_lots: Decimal = group_lots(&items).iter().map(Lot::total_meters).sum();
            prop_assert_eq!(from_lots, summarize(&items).total_meters);
        }
    }
}
