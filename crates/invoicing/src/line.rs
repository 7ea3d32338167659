use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_core::InventoryItemId;
use textileflow_core::money::round_money;

/// Document line: meters of one inventory line at a price per meter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: InventoryItemId,
    pub meters: Decimal,
    pub price: Decimal,
}

impl LineItem {
    pub fn new(item_id: InventoryItemId, meters: Decimal, price: Decimal) -> Self {
        Self {
            item_id,
            meters,
            price,
        }
    }

    /// Line extension (`meters × price`), rounded to money precision.
    pub fn extension(&self) -> Decimal {
        round_money(self.meters * self.price)
    }
}

/// Document total: sum of line extensions.
pub fn lines_total(lines: &[LineItem]) -> Decimal {
    lines.iter().map(LineItem::extension).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_is_sum_of_extensions() {
        let lines = vec![
            LineItem::new(InventoryItemId::new(1), dec!(10), dec!(120)),
            LineItem::new(InventoryItemId::new(2), dec!(2.5), dec!(350.10)),
        ];
        assert_eq!(lines[1].extension(), dec!(875.25));
        assert_eq!(lines_total(&lines), dec!(2075.25));
        assert_eq!(lines_total(&[]), Decimal::ZERO);
    }
}
