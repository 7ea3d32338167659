//! `textileflow-client`: REST client for the TextileFlow ERP backend.
//!
//! - [`config`]: layered client configuration
//! - [`tokens`]: access/refresh token persistence
//! - [`http`]: authenticated JSON client with refresh-on-401
//! - [`dto`] / [`mapping`]: wire records and their validated domain mapping
//! - [`api`]: typed endpoint wrappers
//! - [`import`]: CSV bulk import

pub mod api;
pub mod config;
pub mod dto;
pub mod error;
pub mod http;
pub mod import;
pub mod mapping;
pub mod tokens;

pub use api::CreatedWithPayment;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use http::{ApiClient, SESSION_EXPIRED_MESSAGE};
pub use import::{ImportError, ImportKind, ImportReport, Importer, RowStatus};
pub use tokens::{FileTokenStore, InMemoryTokenStore, TokenPair, TokenStore};
