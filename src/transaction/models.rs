//! Wire representations of ledger transactions.
//!
//! The ledger stores a signed amount; on the wire the amount is unsigned
//! and a `type` field carries the direction, matching what the SPA sends
//! and expects back.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    category::{CategoryId, CategoryKind},
    database_id::{AccountId, TransactionId, UserId},
    money::Money,
    transaction::{Transaction, TransactionDraft},
};

/// The body of a create or update request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub user_id: UserId,
    pub account_id: AccountId,
    pub category_id: CategoryId,
    /// Unsigned; `kind` orients it.
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub date: Date,
    #[serde(default)]
    pub comment: String,
}

impl TransactionRequest {
    /// Split the body into the acting user and the ledger draft.
    pub fn into_draft(self) -> (UserId, TransactionDraft) {
        (
            self.user_id,
            TransactionDraft {
                account_id: self.account_id,
                category_id: self.category_id,
                amount: self.amount,
                kind: self.kind,
                date: self.date,
                comment: self.comment,
            },
        )
    }
}

/// A transaction as it appears in response bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: TransactionId,
    pub user_id: UserId,
    pub account_id: AccountId,
    pub category_id: CategoryId,
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub date: Date,
    pub comment: String,
    pub created_at: OffsetDateTime,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            user_id: transaction.user_id,
            account_id: transaction.account_id,
            category_id: transaction.category_id,
            amount: transaction.amount.abs(),
            kind: transaction.kind(),
            date: transaction.date,
            comment: transaction.comment,
            created_at: transaction.created_at,
        }
    }
}
