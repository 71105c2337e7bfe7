//! The transaction ledger and its endpoints.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionDraft` for creating them
//! - The atomic database operations that keep account balances in step
//!   with the ledger
//! - The JSON route handlers

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod models;
mod update_endpoint;

pub use core::{
    Transaction, TransactionDraft, create_transaction, create_transaction_table,
    delete_transaction, list_transactions, transactions_in_range, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use models::{TransactionRequest, TransactionResponse};
pub use update_endpoint::update_transaction_endpoint;
