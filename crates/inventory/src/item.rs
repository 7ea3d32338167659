use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_core::money::round_money;
use textileflow_core::{DomainError, DomainResult, Entity, InventoryItemId, VendorId};

/// Smallest quantity the backend accepts for a fabric line.
pub const MIN_METERS: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One inventory line: a fabric type within a lot, received from a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub lot_number: String,
    pub fabric_type: String,
    pub meters: Decimal,
    pub unit_price: Decimal,
    pub vendor_id: VendorId,
    pub received_date: NaiveDate,
    /// Whether a purchase bill has already been raised for this line.
    pub is_billed: bool,
}

impl InventoryItem {
    /// Stock value of the line (`meters × unit_price`).
    pub fn total_value(&self) -> Decimal {
        round_money(self.meters * self.unit_price)
    }

    /// Can this line go onto a new bill for `vendor`?
    pub fn billable_for(&self, vendor: VendorId) -> bool {
        !self.is_billed && self.vendor_id == vendor
    }

    /// Can this line be sold on an invoice?
    pub fn sellable(&self) -> bool {
        self.meters > Decimal::ZERO
    }
}

impl Entity for InventoryItem {
    type Id = InventoryItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.lot_number
    }
}

/// Form data for receiving stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub lot_number: String,
    pub fabric_type: String,
    pub meters: Decimal,
    pub unit_price: Decimal,
    pub vendor_id: VendorId,
    pub received_date: NaiveDate,
}

impl NewInventoryItem {
    pub fn validate(&self) -> DomainResult<()> {
        if self.lot_number.trim().is_empty() {
            return Err(DomainError::validation("lot number cannot be empty"));
        }
        if self.fabric_type.trim().is_empty() {
            return Err(DomainError::validation("fabric type cannot be empty"));
        }
        if self.meters < MIN_METERS {
            return Err(DomainError::validation("meters must be at least 0.01"));
        }
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> NewInventoryItem {
        NewInventoryItem {
            lot_number: "LOT-1021".into(),
            fabric_type: "Cotton Twill".into(),
            meters: dec!(450),
            unit_price: dec!(120),
            vendor_id: VendorId::new(1),
            received_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn rejects_tiny_quantities_and_negative_prices() {
        let mut d = draft();
        d.meters = dec!(0.001);
        assert!(d.validate().is_err());

        let mut d = draft();
        d.unit_price = dec!(-1);
        assert!(d.validate().is_err());

        let mut d = draft();
        d.unit_price = dec!(0);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn billable_only_when_unbilled_and_same_vendor() {
        let d = draft();
        let item = InventoryItem {
            id: InventoryItemId::new(1),
            lot_number: d.lot_number,
            fabric_type: d.fabric_type,
            meters: d.meters,
            unit_price: d.unit_price,
            vendor_id: d.vendor_id,
            received_date: d.received_date,
            is_billed: false,
        };
        assert_eq!(item.total_value(), dec!(54000));
        assert!(item.billable_for(VendorId::new(1)));
        assert!(!item.billable_for(VendorId::new(2)));

        let billed = InventoryItem { is_billed: true, ..item };
        assert!(!billed.billable_for(VendorId::new(1)));
    }
}
