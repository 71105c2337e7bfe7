//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::{
    AppState,
    account::{create_account_endpoint, list_accounts_endpoint},
    category::{create_category_endpoint, delete_category_endpoint, list_categories_endpoint},
    endpoints,
    logging::logging_middleware,
    report::stats_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
        update_transaction_endpoint,
    },
    user::{get_user_by_email_endpoint, get_user_endpoint, log_in_endpoint, register_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::USERS,
            post(register_endpoint).get(get_user_by_email_endpoint),
        )
        .route(endpoints::USER, get(get_user_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(
            endpoints::ACCOUNTS,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            patch(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(endpoints::CATEGORY, delete(delete_category_endpoint))
        .route(endpoints::STATS, get(stats_endpoint))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
