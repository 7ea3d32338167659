use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: i64,
    pub lot_number: String,
    pub fabric_type: String,
    pub meters: Decimal,
    pub unit_price: Decimal,
    pub vendor: i64,
    #[serde(default)]
    pub vendor_name: Option<String>,
    pub received_date: NaiveDate,
    #[serde(default)]
    pub is_billed: bool,
    #[serde(default)]
    pub total_value: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryPayload {
    pub lot_number: String,
    pub fabric_type: String,
    pub meters: Decimal,
    pub unit_price: Decimal,
    pub vendor: i64,
    pub received_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMasterRecord {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub standard_price: Option<Decimal>,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMasterPayload {
    pub code: String,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub unit_of_measure: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_price: Option<Decimal>,
}
