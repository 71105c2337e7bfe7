//! The endpoint for creating an account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{AccountResponse, NewAccount, create_account},
    app_state::lock_connection,
    currency::Currency,
    database_id::UserId,
    money::Money,
    user::get_user,
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub user_id: UserId,
    pub name: String,
    pub icon: String,
    /// Defaults to the owning user's currency when omitted.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// Defaults to zero when omitted. May be negative.
    #[serde(default)]
    pub balance: Money,
}

/// A route handler for creating a new account.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let currency = match request.currency {
        Some(currency) => currency,
        None => get_user(request.user_id, &connection)?.currency,
    };

    let account = create_account(
        request.user_id,
        NewAccount {
            name: request.name,
            icon: request.icon,
            currency,
            balance: request.balance,
        },
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(account.into())))
}
