//! Aggregation of ledger data for the statistics page.

mod core;
mod stats_endpoint;

pub use core::{
    CategoryTotal, MonthlyTotals, Totals, monthly_series, totals, totals_by_category,
};
pub use stats_endpoint::{StatsResponse, TotalsResponse, stats_endpoint};
