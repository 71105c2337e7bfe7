//! The endpoint serving the aggregated statistics document.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    category::{CategoryKind, all_categories},
    database_id::UserId,
    money::Money,
    report::{CategoryTotal, MonthlyTotals, monthly_series, totals, totals_by_category},
    transaction::transactions_in_range,
};

/// The state needed to compute statistics.
#[derive(Debug, Clone)]
pub struct StatsState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for StatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    user_id: UserId,
    /// Inclusive lower bound on the calendar date.
    start: Date,
    /// Inclusive upper bound on the calendar date.
    end: Date,
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub income: Money,
    pub expense: Money,
    pub net: Money,
}

/// Everything the statistics page renders, in one document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub totals: TotalsResponse,
    pub income_by_category: Vec<CategoryTotal>,
    pub expense_by_category: Vec<CategoryTotal>,
    pub monthly: Vec<MonthlyTotals>,
}

/// A route handler for the statistics document over an inclusive date
/// range.
pub async fn stats_endpoint(
    State(state): State<StatsState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let entries = transactions_in_range(query.user_id, query.start, query.end, &connection)?;
    let categories = all_categories(query.user_id, &connection)?;

    let overall = totals(&entries);

    Ok(Json(StatsResponse {
        totals: TotalsResponse {
            income: overall.income,
            expense: overall.expense,
            net: overall.net(),
        },
        income_by_category: totals_by_category(&entries, &categories, CategoryKind::Income),
        expense_by_category: totals_by_category(&entries, &categories, CategoryKind::Expense),
        monthly: monthly_series(&entries, query.start, query.end),
    }))
}
