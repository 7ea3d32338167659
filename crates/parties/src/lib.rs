//! Parties domain module: vendors, customers and brokers.
//!
//! Pure data + rules (no IO). Balances are owned by the backend; this crate
//! only knows which sign means who owes whom.

pub mod party;

pub use party::{Broker, Customer, PartyDetails, PartyKind, PartyRef, Vendor};
