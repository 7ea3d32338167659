//! Typed endpoint wrappers, one module per resource group.
//!
//! Each call validates its input locally first, so bad form data never
//! reaches the network, then maps the response into domain types.

mod auth;
mod documents;
mod expenses;
mod inventory;
mod ledger;
mod parties;

pub use documents::CreatedWithPayment;
