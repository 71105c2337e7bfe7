//! Accounts: the per-account balance store and its endpoints.

mod core;
mod create_endpoint;
mod list_endpoint;
mod models;

pub use core::{
    Account, DEFAULT_ACCOUNTS, NewAccount, apply_delta, create_account, create_account_table,
    create_default_accounts, get_account, get_total_balance, list_accounts,
};
pub use create_endpoint::{CreateAccountRequest, create_account_endpoint};
pub use list_endpoint::{AccountListResponse, list_accounts_endpoint};
pub use models::AccountResponse;
