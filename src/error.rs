//! Defines the app level error type and its conversion to JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{category::CategoryId, database_id::AccountId};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid email/password combination.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The email address used to register is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The user's email already exists in the database. The client should
    /// try again with a different email address.
    #[error("a user with this email is already registered")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general internal error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A transaction amount that is zero, negative, or not a finite number.
    ///
    /// Clients submit transaction amounts unsigned; the sign is derived
    /// from the transaction type, so the raw amount must be positive.
    #[error("transaction amount must be a positive number")]
    NonPositiveAmount,

    /// An empty string was used to create an account name.
    #[error("account name cannot be empty")]
    EmptyAccountName,

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A category icon that is not exactly one glyph.
    #[error("category icon must be a single glyph, got \"{0}\"")]
    InvalidCategoryIcon(String),

    /// A category id string that is neither a built-in id nor a row id.
    #[error("\"{0}\" is not a valid category id")]
    MalformedCategoryId(String),

    /// An unknown currency code.
    #[error("\"{0}\" is not a supported currency")]
    InvalidCurrency(String),

    /// The category ID used to create a transaction did not match a
    /// built-in category or a category owned by the user.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// The category's type does not match the transaction's type, e.g. an
    /// expense recorded against an income category.
    #[error("the category {0} is not a {1} category")]
    CategoryKindMismatch(CategoryId, &'static str),

    /// The account ID used on a transaction did not match an account owned
    /// by the user.
    #[error("the account ID {0} does not refer to a valid account")]
    InvalidAccount(AccountId),

    /// The requested resource was not found.
    ///
    /// The client should check that the parameters (e.g., ID) are correct
    /// and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a category that does not exist.
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to delete a category that is still referenced by at least one
    /// transaction. The transactions and the category are left untouched.
    #[error("the category {0} is used by existing transactions")]
    CategoryInUse(CategoryId),

    /// Tried to delete one of the built-in categories.
    #[error("built-in categories cannot be deleted")]
    BuiltinCategoryReadOnly,

    /// A balance delta targeted an account that is not in the database.
    ///
    /// The ledger validates account references before applying deltas, so
    /// this is an internal invariant violation rather than a client error.
    #[error("balance delta applied to missing account {0}")]
    AccountBalanceDesync(AccountId),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::InvalidEmail(_)
            | Error::NonPositiveAmount
            | Error::EmptyAccountName
            | Error::EmptyCategoryName
            | Error::InvalidCategoryIcon(_)
            | Error::MalformedCategoryId(_)
            | Error::InvalidCurrency(_)
            | Error::InvalidCategory(_)
            | Error::CategoryKindMismatch(_, _)
            | Error::InvalidAccount(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::DeleteMissingCategory => StatusCode::NOT_FOUND,
            Error::DuplicateEmail | Error::CategoryInUse(_) | Error::BuiltinCategoryReadOnly => {
                StatusCode::CONFLICT
            }
            Error::HashingError(_)
            | Error::AccountBalanceDesync(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        // Internal details are not intended to be shown to the client.
        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
