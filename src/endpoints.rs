//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/users/{user_id}', use
//! [format_endpoint].

/// The route to register a user (POST) or look one up by email (GET).
pub const USERS: &str = "/api/users";
/// The route to look up a single user.
pub const USER: &str = "/api/users/{user_id}";
/// The route for checking a user's credentials.
pub const LOG_IN: &str = "/api/log_in";
/// The route to list (GET) or create (POST) accounts.
pub const ACCOUNTS: &str = "/api/accounts";
/// The route to list (GET) or create (POST) transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to list (GET) or create (POST) categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route for the aggregated statistics document.
pub const STATS: &str = "/api/stats";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace. For
/// example, in the endpoint path '/api/users/{user_id}', '{user_id}' is
/// the parameter.
///
/// This function assumes that an endpoint path only contains ASCII
/// characters and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
