use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One entry of a party's transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub transaction_type: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub vendor: Option<i64>,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub customer: Option<i64>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpensePayload {
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
