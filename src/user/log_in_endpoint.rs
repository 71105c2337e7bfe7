//! The endpoint for checking a user's credentials.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    user::{UserResponse, verify_credentials},
};

/// The state needed to check credentials.
#[derive(Debug, Clone)]
pub struct LogInState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogInRequest {
    pub email: String,
    pub password: String,
}

/// A route handler for verifying an email and password pair.
///
/// A malformed email fails the same way as a wrong password so the
/// endpoint cannot be used to probe which emails are registered.
pub async fn log_in_endpoint(
    State(state): State<LogInState>,
    Json(request): Json<LogInRequest>,
) -> Result<Json<UserResponse>, Error> {
    let email =
        EmailAddress::from_str(&request.email).map_err(|_| Error::InvalidCredentials)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = verify_credentials(&email, &request.password, &connection)?;

    Ok(Json(user.into()))
}
