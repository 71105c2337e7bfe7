//! The endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    transaction::{TransactionRequest, TransactionResponse, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording a new transaction.
///
/// The ledger row and the account balance adjustment are committed
/// together, so a client can re-read the account immediately and see a
/// consistent figure.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), Error> {
    let (user_id, draft) = request.into_draft();

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(user_id, draft, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}
