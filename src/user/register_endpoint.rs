//! The endpoint for registering a new user.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    account::AccountResponse,
    app_state::lock_connection,
    currency::Currency,
    user::{DEFAULT_USER_NAME, NewUser, PasswordHash, UserResponse, register_user},
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegisterState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegisterState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<Currency>,
}

/// The registered user together with their starter accounts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub accounts: Vec<AccountResponse>,
}

/// A route handler for registering a new user.
///
/// On success the response also carries the three starter accounts that
/// were created alongside the user.
pub async fn register_endpoint(
    State(state): State<RegisterState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), Error> {
    let email = EmailAddress::from_str(&request.email)
        .map_err(|error| Error::InvalidEmail(error.to_string()))?;
    let password_hash = PasswordHash::new(&request.password, PasswordHash::DEFAULT_COST)?;

    let connection = lock_connection(&state.db_connection)?;

    let (user, accounts) = register_user(
        NewUser {
            email,
            password_hash,
            name: request
                .name
                .unwrap_or_else(|| DEFAULT_USER_NAME.to_owned()),
            currency: request.currency.unwrap_or_default(),
        },
        &connection,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: user.into(),
            accounts: accounts.into_iter().map(AccountResponse::from).collect(),
        }),
    ))
}
