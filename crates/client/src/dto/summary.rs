//! Aggregates computed server-side.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountAmount {
    pub count: usize,
    pub amount: Decimal,
}

/// `/invoices/summary/` and `/bills/summary/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummaryRecord {
    #[serde(alias = "total_invoices", alias = "total_bills", default)]
    pub count: usize,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub total_paid: Decimal,
    #[serde(default)]
    pub outstanding: Decimal,
    #[serde(default)]
    pub by_status: BTreeMap<String, CountAmount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummaryRecord {
    pub total_items: usize,
    pub total_meters: Decimal,
    pub unbilled_items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorStockRecord {
    pub vendor_id: i64,
    #[serde(default)]
    pub vendor_name: Option<String>,
    pub item_count: usize,
    pub total_meters: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSummaryRecord {
    pub total: Decimal,
    pub count: usize,
    #[serde(default)]
    pub by_category: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummaryRecord {
    pub total_transactions: usize,
    pub total_amount: Decimal,
    #[serde(default)]
    pub by_type: BTreeMap<String, CountAmount>,
}
