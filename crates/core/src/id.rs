//! Strongly-typed record identifiers.
//!
//! The backend keys every table with an integer primary key. Each entity gets
//! its own newtype so a vendor id can never be passed where a customer id is
//! expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! record_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(i64);

        impl $t {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                if raw <= 0 {
                    return Err(DomainError::invalid_id(format!(
                        "{}: must be positive, got {raw}",
                        $name
                    )));
                }
                Ok(Self(raw))
            }
        }
    };
}

record_id!(/// Identifier of a vendor (supplier).
    VendorId, "VendorId");
record_id!(/// Identifier of a customer.
    CustomerId, "CustomerId");
record_id!(/// Identifier of a broker.
    BrokerId, "BrokerId");
record_id!(/// Identifier of an inventory line (one fabric lot entry).
    InventoryItemId, "InventoryItemId");
record_id!(/// Identifier of an item-master catalog entry.
    ItemMasterId, "ItemMasterId");
record_id!(/// Identifier of a sales invoice.
    InvoiceId, "InvoiceId");
record_id!(/// Identifier of a purchase bill.
    BillId, "BillId");
record_id!(/// Identifier of a payment record.
    PaymentId, "PaymentId");
record_id!(/// Identifier of an expense entry.
    ExpenseId, "ExpenseId");
record_id!(/// Identifier of a party transaction-log entry.
    TransactionId, "TransactionId");
