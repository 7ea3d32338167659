//! Invoicing domain module: sales invoices, purchase bills and their
//! settlement ledgers.
//!
//! Every balance the application shows (document status, remaining amount,
//! broker commission outstanding) is computed here and nowhere else. Pure
//! deterministic logic: no IO, no HTTP, no storage.

pub mod commission;
pub mod document;
pub mod draft;
pub mod line;
pub mod payment;
pub mod settlement;
pub mod status;
pub mod summary;

pub use commission::{BrokerCommission, CommissionTerms, CommissionType, commission_amount};
pub use document::{Bill, DocumentRow, Invoice, Settleable};
pub use draft::{BillDraft, DEFAULT_DUE_DAYS, InvoiceDraft, PreparedDocument};
pub use line::{LineItem, lines_total};
pub use payment::{NewPayment, PaymentMethod, PaymentRecord};
pub use settlement::{
    LedgerRef, PaymentRecorded, RecordPayment, SettlementCommand, SettlementError,
    SettlementEvent, SettlementLedger, SettlementSummary, check_payment, status_for,
};
pub use status::{DocumentKind, SettlementStatus};
pub use summary::{DocumentSummary, StatusBucket, overdue, sort_for_listing, summarize};
