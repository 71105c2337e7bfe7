//! Wire representations of accounts.

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    account::Account,
    currency::Currency,
    database_id::{AccountId, UserId},
    money::Money,
};

/// An account as it appears in response bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: AccountId,
    pub user_id: UserId,
    pub name: String,
    pub icon: String,
    pub currency: Currency,
    pub balance: Money,
    pub created_at: OffsetDateTime,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            user_id: account.user_id,
            name: account.name,
            icon: account.icon,
            currency: account.currency,
            balance: account.balance,
            created_at: account.created_at,
        }
    }
}
