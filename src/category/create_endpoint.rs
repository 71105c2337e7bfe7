//! The endpoint for creating a user category.

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
    app_state::lock_connection,
    category::{
        Category, CategoryIcon, CategoryKind, CategoryName, CategoryResponse, NewCategory,
        create_category,
    },
    database_id::UserId,
};

/// The state needed to create a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub user_id: UserId,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

/// A route handler for creating a new user category.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), Error> {
    let name = CategoryName::new(&request.name)?;
    let icon = CategoryIcon::new(&request.icon)?;

    let connection = lock_connection(&state.db_connection)?;

    let category = create_category(
        request.user_id,
        NewCategory {
            name,
            icon,
            color: request.color,
            kind: request.kind,
        },
        &connection,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(Category::User(category).into()),
    ))
}
