use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLineRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub inventory_item: i64,
    pub meters: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecordDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub method: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub tid: Option<String>,
    #[serde(default)]
    pub invoice: Option<i64>,
    #[serde(default)]
    pub bill: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: i64,
    pub invoice_number: String,
    pub customer: i64,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub broker: Option<i64>,
    #[serde(default)]
    pub broker_name: Option<String>,
    /// `"Percentage"`, `"Fixed"` or blank.
    #[serde(default)]
    pub commission_type: Option<String>,
    #[serde(default)]
    pub commission_value: Option<Decimal>,
    #[serde(default)]
    pub commission_amount: Option<Decimal>,
    #[serde(default)]
    pub commission_paid: Option<Decimal>,
    #[serde(default)]
    pub commission_payments: Vec<PaymentRecordDto>,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub total: Decimal,
    #[serde(default)]
    pub amount_paid: Decimal,
    #[serde(default)]
    pub balance_due: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<DocumentLineRecord>,
    #[serde(default)]
    pub payment_records: Vec<PaymentRecordDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRecord {
    pub id: i64,
    pub bill_number: String,
    pub vendor: i64,
    #[serde(default)]
    pub vendor_name: Option<String>,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub total: Decimal,
    #[serde(default)]
    pub amount_paid: Decimal,
    #[serde(default)]
    pub balance_due: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<DocumentLineRecord>,
    #[serde(default)]
    pub payment_records: Vec<PaymentRecordDto>,
}

/// What `POST /invoices/` and `POST /bills/` answer with: the new id and
/// the echoed fields, without totals or payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDocument {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePayload {
    pub inventory_item: i64,
    pub meters: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoicePayload {
    pub invoice_number: String,
    pub customer: i64,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<LinePayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBillPayload {
    pub bill_number: String,
    pub vendor: i64,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<LinePayload>,
}

/// Body of `add_payment` and `settle_commission`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPayload {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
}
