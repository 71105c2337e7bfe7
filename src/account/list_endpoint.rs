//! The endpoint for listing a user's accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    account::{AccountResponse, get_total_balance, list_accounts},
    app_state::lock_connection,
    database_id::UserId,
    money::Money,
};

/// The state needed to list accounts.
#[derive(Debug, Clone)]
pub struct ListAccountsState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListAccountsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsQuery {
    user_id: UserId,
}

/// A user's accounts plus their combined balance.
///
/// The total is computed from the stored balances on every request, never
/// stored itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountListResponse {
    pub accounts: Vec<AccountResponse>,
    pub total_balance: Money,
}

/// A route handler for listing all of a user's accounts.
pub async fn list_accounts_endpoint(
    State(state): State<ListAccountsState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<AccountListResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let accounts = list_accounts(query.user_id, &connection)?
        .into_iter()
        .map(AccountResponse::from)
        .collect();
    let total_balance = get_total_balance(query.user_id, &connection)?;

    Ok(Json(AccountListResponse {
        accounts,
        total_balance,
    }))
}
