//! Defines the transaction ledger and its three mutating operations.
//!
//! Every mutating operation pairs the ledger row write with the matching
//! account balance delta inside one SQL transaction, so a transaction can
//! never be persisted without its effect on the balance (or vice versa).

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    account::{apply_delta, get_account},
    category::{CategoryId, CategoryKind, resolve_category},
    database_id::{AccountId, TransactionId, UserId},
    money::Money,
};

/// An expense or income, i.e. an event where money was either spent or
/// earned.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user who owns the transaction.
    pub user_id: UserId,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// The signed amount: positive for income, negative for expenses.
    ///
    /// The sign is the canonical source of the transaction type; there is
    /// no separate stored type field that could disagree with it.
    pub amount: Money,
    /// The calendar day the transaction happened (distinct from when it
    /// was recorded).
    pub date: Date,
    /// A free-text note, empty when the user did not leave one.
    pub comment: String,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Whether the transaction is income or an expense, derived from the
    /// sign of the amount.
    pub fn kind(&self) -> CategoryKind {
        if self.amount.is_negative() {
            CategoryKind::Expense
        } else {
            CategoryKind::Income
        }
    }
}

/// The client-supplied fields of a transaction.
///
/// The amount arrives unsigned; `kind` orients it (income stays positive,
/// expense is negated).
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// The unsigned amount; must be greater than zero.
    pub amount: Money,
    /// Whether the amount was earned or spent.
    pub kind: CategoryKind,
    /// The calendar day the transaction happened.
    pub date: Date,
    /// A free-text note.
    pub comment: String,
}

impl TransactionDraft {
    /// The amount with the sign derived from the transaction kind.
    fn signed_amount(&self) -> Money {
        match self.kind {
            CategoryKind::Income => self.amount,
            CategoryKind::Expense => -self.amount,
        }
    }
}

/// Check a draft against the catalog and the user's accounts.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or negative,
/// - [Error::InvalidCategory] if the category id does not resolve for the
///   user,
/// - [Error::CategoryKindMismatch] if the resolved category's type does
///   not match the draft's type,
/// - [Error::InvalidAccount] if the account does not exist or belongs to
///   another user.
fn validate_draft(
    user_id: UserId,
    draft: &TransactionDraft,
    connection: &Connection,
) -> Result<(), Error> {
    if !draft.amount.is_positive() {
        return Err(Error::NonPositiveAmount);
    }

    let category = resolve_category(draft.category_id, user_id, connection)?;

    if category.kind() != draft.kind {
        return Err(Error::CategoryKindMismatch(
            draft.category_id,
            draft.kind.as_str(),
        ));
    }

    let account = get_account(draft.account_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidAccount(draft.account_id),
        other => other,
    })?;

    if account.user_id != user_id {
        return Err(Error::InvalidAccount(draft.account_id));
    }

    Ok(())
}

/// Record a new transaction and apply its effect to the account balance.
///
/// Both writes happen in one SQL transaction.
///
/// # Errors
/// This function will return the validation errors of [TransactionDraft]
/// checking (see [create_transaction] callers), or an [Error::SqlError]
/// if there is an SQL error.
pub fn create_transaction(
    user_id: UserId,
    draft: TransactionDraft,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_draft(user_id, &draft, connection)?;

    let signed_amount = draft.signed_amount();
    let created_at = OffsetDateTime::now_utc();

    let tx = connection.unchecked_transaction()?;

    let id = tx
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, account_id, category_id, amount, date, comment, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id",
        )?
        .query_row(
            (
                user_id,
                draft.account_id,
                draft.category_id,
                signed_amount,
                draft.date,
                &draft.comment,
                created_at,
            ),
            |row| row.get(0),
        )?;

    apply_delta(draft.account_id, signed_amount, &tx)?;

    tx.commit()?;

    Ok(Transaction {
        id,
        user_id,
        account_id: draft.account_id,
        category_id: draft.category_id,
        amount: signed_amount,
        date: draft.date,
        comment: draft.comment,
        created_at,
    })
}

/// Replace a transaction's fields and reconcile the account balances.
///
/// If the account reference changed, the old account is credited back the
/// old amount and the new account receives the new amount; otherwise the
/// unchanged account receives only the difference. `created_at` is never
/// modified. All writes happen in one SQL transaction.
///
/// # Errors
/// This function will return an [Error::UpdateMissingTransaction] if `id`
/// does not refer to a transaction owned by `user_id`, the draft
/// validation errors, or an [Error::SqlError] if there is an SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserId,
    draft: TransactionDraft,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tx = connection.unchecked_transaction()?;

    // The previous transaction is loaded before the draft is validated so
    // that an edit of a missing transaction reports the missing id rather
    // than whatever is wrong with the draft.
    let previous = get_owned_transaction(id, user_id, &tx).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        other => other,
    })?;

    validate_draft(user_id, &draft, &tx)?;

    let new_amount = draft.signed_amount();

    if previous.account_id == draft.account_id {
        apply_delta(draft.account_id, new_amount - previous.amount, &tx)?;
    } else {
        apply_delta(previous.account_id, -previous.amount, &tx)?;
        apply_delta(draft.account_id, new_amount, &tx)?;
    }

    tx.execute(
        "UPDATE \"transaction\"
         SET account_id = ?1, category_id = ?2, amount = ?3, date = ?4, comment = ?5
         WHERE id = ?6;",
        (
            draft.account_id,
            draft.category_id,
            new_amount,
            draft.date,
            &draft.comment,
            id,
        ),
    )?;

    tx.commit()?;

    Ok(Transaction {
        id,
        user_id,
        account_id: draft.account_id,
        category_id: draft.category_id,
        amount: new_amount,
        date: draft.date,
        comment: draft.comment,
        created_at: previous.created_at,
    })
}

/// Remove a transaction and reverse its effect on the account balance.
///
/// Both writes happen in one SQL transaction.
///
/// # Errors
/// This function will return an [Error::DeleteMissingTransaction] if `id`
/// does not refer to a transaction owned by `user_id`, or an
/// [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let tx = connection.unchecked_transaction()?;

    let transaction = get_owned_transaction(id, user_id, &tx).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingTransaction,
        other => other,
    })?;

    apply_delta(transaction.account_id, -transaction.amount, &tx)?;
    tx.execute("DELETE FROM \"transaction\" WHERE id = ?1;", [id])?;

    tx.commit()?;

    Ok(())
}

/// Retrieve all of a user's transactions, newest calendar date first.
///
/// The sort order (date descending, then id ascending so the order stays
/// stable after updates) is a display convention, not a ledger invariant.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn list_transactions(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, account_id, category_id, amount, date, comment, created_at
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY date DESC, id ASC;",
        )?
        .query_map(&[(":user_id", &user_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a user's transactions whose calendar date falls in
/// `[start, end]`, inclusive on both ends, newest first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn transactions_in_range(
    user_id: UserId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, account_id, category_id, amount, date, comment, created_at
             FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date DESC, id ASC;",
        )?
        .query_map((user_id, start, end), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

fn get_owned_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, account_id, category_id, amount, date, comment, created_at
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(&[(":id", &id), (":user_id", &user_id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            account_id INTEGER NOT NULL,
            category_id TEXT NOT NULL,
            amount INTEGER NOT NULL,
            date TEXT NOT NULL,
            comment TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id),
            FOREIGN KEY(account_id) REFERENCES account(id)
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, date);

        CREATE INDEX IF NOT EXISTS idx_transaction_category
            ON \"transaction\"(user_id, category_id);",
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        account_id: row.get(2)?,
        category_id: row.get(3)?,
        amount: row.get(4)?,
        date: row.get(5)?,
        comment: row.get(6)?,
        created_at: row.get(7)?,
    })
}
