//! `textileflow-app`: feature services and terminal views over the API
//! client.
//!
//! - [`workspace`]: the operations a trading desk performs, with local
//!   checks and toasts
//! - [`snapshot`]: the loaded data and the reports derived from it
//! - [`render`]: tables for the `textileflow` CLI

pub mod render;
pub mod snapshot;
pub mod workspace;

pub use snapshot::Snapshot;
pub use workspace::Workspace;
