//! Defines the account model and the balance store operations.
//!
//! An account's balance is the signed sum of every transaction that
//! references it. The ledger maintains that sum incrementally through
//! [apply_delta]; nothing else may mutate a balance after creation.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    currency::Currency,
    database_id::{AccountId, UserId},
    money::Money,
};

/// A place money is kept, e.g. a wallet or a bank card.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The user who owns the account.
    pub user_id: UserId,
    /// The name of the account.
    pub name: String,
    /// The icon tag shown next to the account name.
    pub icon: String,
    /// The currency the account is denominated in.
    pub currency: Currency,
    /// The current balance after all settled transactions.
    pub balance: Money,
    /// When the account was created.
    pub created_at: OffsetDateTime,
}

/// The fields needed to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// The name of the account.
    pub name: String,
    /// The icon tag shown next to the account name.
    pub icon: String,
    /// The currency the account is denominated in.
    pub currency: Currency,
    /// The starting balance. May be negative, e.g. an overdrawn card.
    pub balance: Money,
}

/// The accounts created for every user at registration.
pub const DEFAULT_ACCOUNTS: [(&str, &str); 3] = [
    ("Wallet", "money-bill-wave"),
    ("Bank Card", "credit-card"),
    ("Investments", "chart-line"),
];

/// Create an account in the database.
///
/// # Errors
/// This function will return an [Error::EmptyAccountName] if the name is
/// an empty string, or an [Error::SqlError] if there is an SQL error.
pub fn create_account(
    user_id: UserId,
    new_account: NewAccount,
    connection: &Connection,
) -> Result<Account, Error> {
    if new_account.name.is_empty() {
        return Err(Error::EmptyAccountName);
    }

    let created_at = OffsetDateTime::now_utc();

    let id = connection
        .prepare(
            "INSERT INTO account (user_id, name, icon, currency, balance, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id",
        )?
        .query_row(
            (
                user_id,
                &new_account.name,
                &new_account.icon,
                new_account.currency,
                new_account.balance,
                created_at,
            ),
            |row| row.get(0),
        )?;

    Ok(Account {
        id,
        user_id,
        name: new_account.name,
        icon: new_account.icon,
        currency: new_account.currency,
        balance: new_account.balance,
        created_at,
    })
}

/// Create the default zero-balance accounts for a newly registered user.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn create_default_accounts(
    user_id: UserId,
    currency: Currency,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    DEFAULT_ACCOUNTS
        .iter()
        .map(|(name, icon)| {
            create_account(
                user_id,
                NewAccount {
                    name: (*name).to_owned(),
                    icon: (*icon).to_owned(),
                    currency,
                    balance: Money::ZERO,
                },
                connection,
            )
        })
        .collect()
}

/// Retrieve an account by its `id`.
///
/// # Errors
/// This function will return an [Error::NotFound] if `id` does not refer
/// to an account, or an [Error::SqlError] if there is some other SQL error.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, icon, currency, balance, created_at
             FROM account WHERE id = :id;",
        )?
        .query_row(&[(":id", &id)], map_account_row)
        .map_err(|error| error.into())
}

/// Retrieve all accounts belonging to `user_id`, in creation order.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn list_accounts(user_id: UserId, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, icon, currency, balance, created_at
             FROM account WHERE user_id = :user_id ORDER BY id ASC;",
        )?
        .query_map(&[(":user_id", &user_id)], map_account_row)?
        .map(|maybe_account| maybe_account.map_err(|error| error.into()))
        .collect()
}

/// Add `delta` to an account's balance.
///
/// This is the only sanctioned balance mutation after creation; the ledger
/// calls it with the signed effect of each transaction change.
///
/// # Errors
/// This function will return an [Error::AccountBalanceDesync] if the
/// account does not exist. The ledger validates account references before
/// applying deltas, so that is an internal error, not a client error.
pub fn apply_delta(
    account_id: AccountId,
    delta: Money,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2;",
        (delta, account_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::AccountBalanceDesync(account_id));
    }

    Ok(())
}

/// Get the total balance across all of a user's accounts.
///
/// The total is computed, never stored. Balances are INTEGER minor units,
/// so the SQL SUM is exact.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_total_balance(user_id: UserId, connection: &Connection) -> Result<Money, Error> {
    let total: i64 = connection.query_row(
        "SELECT COALESCE(SUM(balance), 0) FROM account WHERE user_id = ?1;",
        [user_id],
        |row| row.get(0),
    )?;

    Ok(Money::from_minor_units(total))
}

/// Create the account table in the database.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            currency TEXT NOT NULL,
            balance INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id)
        );

        CREATE INDEX IF NOT EXISTS idx_account_user ON account(user_id);",
    )?;

    Ok(())
}

fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        icon: row.get(3)?,
        currency: row.get(4)?,
        balance: row.get(5)?,
        created_at: row.get(6)?,
    })
}
