//! Restock command, writer and service.

mod command;
mod service;
mod writer;

pub use command::{CommandOptions, RestockSkuCommand, RestockSkuData};
pub use service::RestockService;
pub use writer::{LedgerWriter, RestockOutcome};
