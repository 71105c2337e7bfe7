//! The endpoint for listing the category catalog.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    category::{CategoryResponse, all_categories},
    database_id::UserId,
};

/// The state needed to list categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCategoriesQuery {
    user_id: UserId,
}

/// A route handler for listing the built-in categories followed by the
/// user's own.
pub async fn list_categories_endpoint(
    State(state): State<ListCategoriesState>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<Vec<CategoryResponse>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let categories = all_categories(query.user_id, &connection)?
        .iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(Json(categories))
}
