//! The endpoints for looking up users by id or email.
//!
//! The SPA uses the email lookup once at start-up to restore a session;
//! both lookups return the same body as registration, minus the accounts.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    database_id::UserId,
    user::{UserResponse, get_user, get_user_by_email},
};

/// The state needed to look up a user.
#[derive(Debug, Clone)]
pub struct LookupUserState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LookupUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupUserQuery {
    email: String,
}

/// A route handler for looking up a user by email.
pub async fn get_user_by_email_endpoint(
    State(state): State<LookupUserState>,
    Query(query): Query<LookupUserQuery>,
) -> Result<Json<UserResponse>, Error> {
    let email = EmailAddress::from_str(&query.email)
        .map_err(|error| Error::InvalidEmail(error.to_string()))?;

    let connection = lock_connection(&state.db_connection)?;
    let user = get_user_by_email(&email, &connection)?;

    Ok(Json(user.into()))
}

/// A route handler for looking up a user by id.
pub async fn get_user_endpoint(
    State(state): State<LookupUserState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user(user_id, &connection)?;

    Ok(Json(user.into()))
}
