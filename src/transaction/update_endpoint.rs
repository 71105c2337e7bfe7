//! The endpoint for editing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    database_id::TransactionId,
    transaction::{TransactionRequest, TransactionResponse, update_transaction},
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for editing a transaction.
///
/// Replaces every stored field except the creation timestamp and settles
/// the balance difference on the affected account(s) in the same commit.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Json(request): Json<TransactionRequest>,
) -> Result<Json<TransactionResponse>, Error> {
    let (user_id, draft) = request.into_draft();

    let connection = lock_connection(&state.db_connection)?;
    let transaction = update_transaction(transaction_id, user_id, draft, &connection)?;

    Ok(Json(transaction.into()))
}
