//! `textileflow-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! record identifiers, money helpers, the domain error model and the aggregate
//! traits used by the settlement ledgers.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    BillId, BrokerId, CustomerId, ExpenseId, InventoryItemId, InvoiceId, ItemMasterId, PaymentId,
    TransactionId, VendorId,
};
pub use money::Amount;
