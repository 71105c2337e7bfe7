//! Pure aggregation over ledger slices for the statistics endpoint.
//!
//! Nothing in this module touches the database: every function takes the
//! transactions (and, where needed, the category catalog) already loaded
//! for a user and reduces them to report figures.

use std::collections::HashMap;

use serde::Serialize;
use time::{Date, Month};

use crate::{
    category::{Category, CategoryId, CategoryKind},
    money::Money,
    transaction::Transaction,
};

/// Income and expense sums over a set of transactions.
///
/// Both figures are absolute values; the sign lives in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub income: Money,
    pub expense: Money,
}

impl Totals {
    /// Income minus expenses.
    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}

/// Sum transaction amounts partitioned by sign.
pub fn totals(entries: &[Transaction]) -> Totals {
    let mut income = Money::ZERO;
    let mut expense = Money::ZERO;

    for entry in entries {
        match entry.kind() {
            CategoryKind::Income => income += entry.amount,
            CategoryKind::Expense => expense += entry.amount.abs(),
        }
    }

    Totals { income, expense }
}

/// The spending (or earning) attributed to one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// `None` for the synthetic bucket that collects amounts whose
    /// category id no longer resolves against the catalog.
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub total: Money,
}

/// Sum absolute amounts per category for one transaction kind.
///
/// Buckets follow catalog order. Entries whose category id is absent from
/// `categories` fall into a trailing "Unknown" bucket. Buckets that stay
/// at zero are dropped from the result.
pub fn totals_by_category(
    entries: &[Transaction],
    categories: &[Category],
    kind: CategoryKind,
) -> Vec<CategoryTotal> {
    let mut buckets: Vec<CategoryTotal> = Vec::new();
    let mut index_by_id: HashMap<CategoryId, usize> = HashMap::new();

    for category in categories {
        if category.kind() != kind {
            continue;
        }

        index_by_id.insert(category.id(), buckets.len());
        buckets.push(CategoryTotal {
            category_id: Some(category.id()),
            name: category.name().to_owned(),
            icon: category.icon().to_owned(),
            color: category.color().to_owned(),
            total: Money::ZERO,
        });
    }

    let mut unknown = Money::ZERO;

    for entry in entries {
        if entry.kind() != kind {
            continue;
        }

        match index_by_id.get(&entry.category_id) {
            Some(&index) => buckets[index].total += entry.amount.abs(),
            None => unknown += entry.amount.abs(),
        }
    }

    buckets.retain(|bucket| bucket.total.is_positive());

    if unknown.is_positive() {
        buckets.push(CategoryTotal {
            category_id: None,
            name: "Unknown".to_owned(),
            icon: "❔".to_owned(),
            color: "#9E9E9E".to_owned(),
            total: unknown,
        });
    }

    buckets
}

/// One month's income and expense figures for the bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    /// Chart label, e.g. `"Jan 2024"`.
    pub label: String,
    pub income: Money,
    pub expense: Money,
}

/// Sum absolute amounts per calendar month over `[start, end]`.
///
/// Produces one entry for every month from `start`'s month through
/// `end`'s month inclusive, chronological and zero-filled, so charts get
/// a gapless axis. Returns an empty vector when `end` precedes `start`.
pub fn monthly_series(entries: &[Transaction], start: Date, end: Date) -> Vec<MonthlyTotals> {
    let mut series = Vec::new();
    let mut index_by_month: HashMap<Date, usize> = HashMap::new();

    let mut month = start.replace_day(1).unwrap();
    let last = end.replace_day(1).unwrap();

    while month <= last {
        index_by_month.insert(month, series.len());
        series.push(MonthlyTotals {
            label: format_month_label(month),
            income: Money::ZERO,
            expense: Money::ZERO,
        });

        month = match month.month() {
            Month::December => {
                Date::from_calendar_date(month.year() + 1, Month::January, 1).unwrap()
            }
            other => month.replace_month(other.next()).unwrap(),
        };
    }

    for entry in entries {
        let Some(&index) = index_by_month.get(&entry.date.replace_day(1).unwrap()) else {
            continue;
        };

        match entry.kind() {
            CategoryKind::Income => series[index].income += entry.amount,
            CategoryKind::Expense => series[index].expense += entry.amount.abs(),
        }
    }

    series
}

/// Formats the first of a month as a chart label, e.g. `"Mar 2024"`.
fn format_month_label(month: Date) -> String {
    let abbreviation = match month.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{abbreviation} {}", month.year())
}
