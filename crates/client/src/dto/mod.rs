//! Wire records exchanged with the REST API.
//!
//! These mirror the JSON exactly; conversion into domain types (with
//! validation) lives in [`crate::mapping`]. Monetary fields accept both
//! decimal strings and JSON numbers.

pub mod auth;
pub mod document;
pub mod inventory;
pub mod ledger;
pub mod party;
pub mod summary;

pub use auth::UserRecord;
pub use document::{
    BillRecord, CreatedDocument, DocumentLineRecord, InvoiceRecord, LinePayload, NewBillPayload,
    NewInvoicePayload, PaymentPayload, PaymentRecordDto,
};
pub use inventory::{InventoryRecord, InventoryPayload, ItemMasterPayload, ItemMasterRecord};
pub use ledger::{ExpensePayload, ExpenseRecord, TransactionRecord};
pub use party::{BrokerRecord, CustomerRecord, PartyPayload, VendorRecord};
pub use summary::{
    CountAmount, DocumentSummaryRecord, ExpenseSummaryRecord, InventorySummaryRecord,
    TransactionSummaryRecord, VendorStockRecord,
};
