//! The user model: registration, lookups, and credential checks.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    account::{Account, create_default_accounts},
    currency::Currency,
    database_id::UserId,
};

/// The display name given to users who do not pick one at registration.
pub const DEFAULT_USER_NAME: &str = "New User";

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a raw password with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed
    /// to verify a password. Pass [PasswordHash::DEFAULT_COST] to use the
    /// recommended cost.
    ///
    /// # Errors
    /// This function will return an [Error::HashingError] if the password
    /// could not be hashed.
    pub fn new(raw_password: &str, cost: u32) -> Result<Self, Error> {
        match bcrypt::hash(raw_password, cost) {
            Ok(password_hash) => Ok(Self(password_hash)),
            Err(error) => Err(Error::HashingError(error.to_string())),
        }
    }

    /// Create a new `PasswordHash` without any validation.
    ///
    /// The caller should ensure that `raw_password_hash` is a valid bcrypt
    /// hash.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &str) -> Result<bool, bcrypt::BcryptError> {
        bcrypt::verify(raw_password, &self.0)
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's email address, unique across the application.
    pub email: EmailAddress,
    /// The user's password hash. Must never appear in a response body.
    pub password_hash: PasswordHash,
    /// The user's display name.
    pub name: String,
    /// The currency the user's figures are displayed in. Fixed at
    /// registration.
    pub currency: Currency,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}

/// The fields needed to register a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub name: String,
    pub currency: Currency,
}

/// Insert a new user and their starter accounts.
///
/// Every user starts with a "Wallet", "Bank Card", and "Investments"
/// account at zero balance, denominated in their chosen currency. The
/// user row and the account rows are written in one SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateEmail] if the email is already registered,
/// - [Error::SqlError] if there is some other SQL error.
pub fn register_user(
    new_user: NewUser,
    connection: &Connection,
) -> Result<(User, Vec<Account>), Error> {
    let created_at = OffsetDateTime::now_utc();

    let tx = connection.unchecked_transaction()?;

    let id = tx
        .prepare(
            "INSERT INTO user (email, password, name, currency, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
        )?
        .query_row(
            (
                new_user.email.as_str(),
                new_user.password_hash.to_string(),
                &new_user.name,
                new_user.currency,
                created_at,
            ),
            |row| row.get(0),
        )?;

    let accounts = create_default_accounts(id, new_user.currency, &tx)?;

    tx.commit()?;

    Ok((
        User {
            id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            currency: new_user.currency,
            created_at,
        },
        accounts,
    ))
}

/// Get the user with an ID equal to `user_id`.
///
/// # Errors
/// This function will return an [Error::NotFound] if `user_id` does not
/// belong to a registered user, or an [Error::SqlError] if there is an
/// SQL error.
pub fn get_user(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, password, name, currency, created_at
             FROM user WHERE id = :id;",
        )?
        .query_row(&[(":id", &user_id)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered under `email`.
///
/// # Errors
/// This function will return an [Error::NotFound] if no user is registered
/// under `email`, or an [Error::SqlError] if there is an SQL error.
pub fn get_user_by_email(email: &EmailAddress, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, password, name, currency, created_at
             FROM user WHERE email = :email;",
        )?
        .query_row(&[(":email", &email.as_str())], map_user_row)
        .map_err(|error| error.into())
}

/// Check an email and password pair against the stored credentials.
///
/// An unknown email and a wrong password both produce
/// [Error::InvalidCredentials], so a caller cannot probe which emails are
/// registered.
///
/// # Errors
/// This function will return an [Error::InvalidCredentials] if the pair
/// does not match a registered user, an [Error::HashingError] if the
/// stored hash could not be checked, or an [Error::SqlError] if there is
/// an SQL error.
pub fn verify_credentials(
    email: &EmailAddress,
    raw_password: &str,
    connection: &Connection,
) -> Result<User, Error> {
    let user = get_user_by_email(email, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCredentials,
        other => other,
    })?;

    match user.password_hash.verify(raw_password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}

/// Create the user table in the database.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            name TEXT NOT NULL,
            currency TEXT NOT NULL,
            created_at TEXT NOT NULL
        );",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(1)?;
    let email = EmailAddress::from_str(&raw_email)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, error.into()))?;
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: row.get(0)?,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        name: row.get(3)?,
        currency: row.get(4)?,
        created_at: row.get(5)?,
    })
}
