//! The endpoint for listing a user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    database_id::UserId,
    transaction::{TransactionResponse, list_transactions, transactions_in_range},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    user_id: UserId,
    /// Inclusive lower bound on the calendar date.
    #[serde(default)]
    start: Option<Date>,
    /// Inclusive upper bound on the calendar date.
    #[serde(default)]
    end: Option<Date>,
}

/// A route handler for listing a user's transactions, optionally filtered
/// to an inclusive calendar date range.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transactions = match (query.start, query.end) {
        (None, None) => list_transactions(query.user_id, &connection)?,
        (start, end) => transactions_in_range(
            query.user_id,
            start.unwrap_or(Date::MIN),
            end.unwrap_or(Date::MAX),
            &connection,
        )?,
    };

    Ok(Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    ))
}
