//! End-to-end tests that exercise the JSON API through the full router.

use axum::http::StatusCode;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};

use kopilka::{AppState, build_router, endpoints, endpoints::format_endpoint};

fn test_server() -> TestServer {
    let connection = Connection::open_in_memory().expect("Could not open database");
    let state = AppState::new(connection).expect("Could not initialize database");

    TestServer::new(build_router(state))
}

/// Register a user and return the response body (user + starter accounts).
async fn register(server: &TestServer, email: &str) -> Value {
    let response = server
        .post(endpoints::USERS)
        .json(&json!({ "email": email, "password": "hunter2" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

fn user_id_of(registration: &Value) -> i64 {
    registration["user"]["id"].as_i64().expect("missing user id")
}

fn first_account_id_of(registration: &Value) -> i64 {
    registration["accounts"][0]["id"]
        .as_i64()
        .expect("missing account id")
}

async fn post_transaction(server: &TestServer, body: Value) -> Value {
    let response = server.post(endpoints::TRANSACTIONS).json(&body).await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

async fn account_balances(server: &TestServer, user_id: i64) -> Value {
    let response = server
        .get(endpoints::ACCOUNTS)
        .add_query_param("userId", user_id)
        .await;

    response.assert_status_ok();
    response.json::<Value>()
}

#[tokio::test]
async fn registration_creates_user_and_starter_accounts() {
    let server = test_server();

    let body = register(&server, "foo@bar.baz").await;

    assert_eq!(body["user"]["email"], "foo@bar.baz");
    assert_eq!(body["user"]["name"], "New User");
    assert_eq!(body["user"]["currency"], "RUB");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());

    let names: Vec<&str> = body["accounts"]
        .as_array()
        .expect("accounts should be an array")
        .iter()
        .map(|account| account["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Wallet", "Bank Card", "Investments"]);
    assert!(
        body["accounts"]
            .as_array()
            .unwrap()
            .iter()
            .all(|account| account["balance"] == json!(0.0))
    );
}

#[tokio::test]
async fn registration_rejects_duplicate_email() {
    let server = test_server();
    register(&server, "foo@bar.baz").await;

    let response = server
        .post(endpoints::USERS)
        .json(&json!({ "email": "foo@bar.baz", "password": "hunter2" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn registration_rejects_malformed_email() {
    let server = test_server();

    let response = server
        .post(endpoints::USERS)
        .json(&json!({ "email": "not-an-email", "password": "hunter2" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn log_in_round_trips_registered_credentials() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;

    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "email": "foo@bar.baz", "password": "hunter2" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["id"],
        registration["user"]["id"]
    );
}

#[tokio::test]
async fn log_in_rejects_the_wrong_password() {
    let server = test_server();
    register(&server, "foo@bar.baz").await;

    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "email": "foo@bar.baz", "password": "letmein" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn users_can_be_looked_up_by_id_and_email() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;
    let user_id = user_id_of(&registration);

    let by_id = server
        .get(&format_endpoint(endpoints::USER, user_id))
        .await;
    by_id.assert_status_ok();
    assert_eq!(by_id.json::<Value>()["email"], "foo@bar.baz");

    let by_email = server
        .get(endpoints::USERS)
        .add_query_param("email", "foo@bar.baz")
        .await;
    by_email.assert_status_ok();
    assert_eq!(by_email.json::<Value>()["id"], json!(user_id));
}

#[tokio::test]
async fn unknown_user_lookup_is_not_found() {
    let server = test_server();

    let response = server.get(&format_endpoint(endpoints::USER, 404)).await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_accounts_appear_in_the_list_with_a_computed_total() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;
    let user_id = user_id_of(&registration);

    let response = server
        .post(endpoints::ACCOUNTS)
        .json(&json!({
            "userId": user_id,
            "name": "Savings",
            "icon": "piggy-bank",
            "balance": 250.75
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();
    assert_eq!(created["balance"], json!(250.75));
    // Currency falls back to the owner's.
    assert_eq!(created["currency"], "RUB");

    let list = account_balances(&server, user_id).await;
    assert_eq!(list["accounts"].as_array().unwrap().len(), 4);
    assert_eq!(list["totalBalance"], json!(250.75));
}

#[tokio::test]
async fn transaction_lifecycle_keeps_the_account_balance_in_step() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;
    let user_id = user_id_of(&registration);
    let account_id = first_account_id_of(&registration);

    // Add income of 100.
    let income = post_transaction(
        &server,
        json!({
            "userId": user_id,
            "accountId": account_id,
            "categoryId": "default_salary",
            "amount": 100.0,
            "type": "income",
            "date": "2024-01-10"
        }),
    )
    .await;
    assert_eq!(income["amount"], json!(100.0));
    assert_eq!(income["type"], "income");
    let list = account_balances(&server, user_id).await;
    assert_eq!(list["totalBalance"], json!(100.0));

    // Edit it down to 40.
    let income_id = income["id"].as_i64().unwrap();
    let response = server
        .patch(&format_endpoint(endpoints::TRANSACTION, income_id))
        .json(&json!({
            "userId": user_id,
            "accountId": account_id,
            "categoryId": "default_salary",
            "amount": 40.0,
            "type": "income",
            "date": "2024-01-10"
        }))
        .await;
    response.assert_status_ok();
    let list = account_balances(&server, user_id).await;
    assert_eq!(list["totalBalance"], json!(40.0));

    // Add an expense of 25.
    let expense = post_transaction(
        &server,
        json!({
            "userId": user_id,
            "accountId": account_id,
            "categoryId": "default_products",
            "amount": 25.0,
            "type": "expense",
            "date": "2024-01-12"
        }),
    )
    .await;
    let list = account_balances(&server, user_id).await;
    assert_eq!(list["totalBalance"], json!(15.0));

    // Delete the expense, then the income.
    let expense_id = expense["id"].as_i64().unwrap();
    server
        .delete(&format_endpoint(endpoints::TRANSACTION, expense_id))
        .add_query_param("userId", user_id)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let list = account_balances(&server, user_id).await;
    assert_eq!(list["totalBalance"], json!(40.0));

    server
        .delete(&format_endpoint(endpoints::TRANSACTION, income_id))
        .add_query_param("userId", user_id)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let list = account_balances(&server, user_id).await;
    assert_eq!(list["totalBalance"], json!(0.0));
}

#[tokio::test]
async fn transactions_reject_a_zero_amount() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;

    let response = server
        .post(endpoints::TRANSACTIONS)
        .json(&json!({
            "userId": user_id_of(&registration),
            "accountId": first_account_id_of(&registration),
            "categoryId": "default_salary",
            "amount": 0.0,
            "type": "income",
            "date": "2024-01-10"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transactions_reject_a_category_of_the_wrong_kind() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;

    let response = server
        .post(endpoints::TRANSACTIONS)
        .json(&json!({
            "userId": user_id_of(&registration),
            "accountId": first_account_id_of(&registration),
            "categoryId": "default_products",
            "amount": 10.0,
            "type": "income",
            "date": "2024-01-10"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transaction_listing_filters_by_inclusive_date_range() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;
    let user_id = user_id_of(&registration);
    let account_id = first_account_id_of(&registration);

    for date in ["2024-02-29", "2024-03-01", "2024-03-31", "2024-04-01"] {
        post_transaction(
            &server,
            json!({
                "userId": user_id,
                "accountId": account_id,
                "categoryId": "default_salary",
                "amount": 1.0,
                "type": "income",
                "date": date
            }),
        )
        .await;
    }

    let response = server
        .get(endpoints::TRANSACTIONS)
        .add_query_param("userId", user_id)
        .add_query_param("start", "2024-03-01")
        .add_query_param("end", "2024-03-31")
        .await;

    response.assert_status_ok();
    let transactions = response.json::<Value>();
    let dates: Vec<&str> = transactions
        .as_array()
        .unwrap()
        .iter()
        .map(|transaction| transaction["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-03-31", "2024-03-01"]);
}

#[tokio::test]
async fn catalog_lists_builtins_before_user_categories() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;
    let user_id = user_id_of(&registration);

    let response = server
        .post(endpoints::CATEGORIES)
        .json(&json!({
            "userId": user_id,
            "name": "Pets",
            "icon": "🐈",
            "color": "#FF9800",
            "type": "expense"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();

    let list = server
        .get(endpoints::CATEGORIES)
        .add_query_param("userId", user_id)
        .await;
    list.assert_status_ok();
    let categories = list.json::<Value>();
    let categories = categories.as_array().unwrap();

    assert_eq!(categories.len(), 10);
    assert_eq!(categories[0]["id"], "default_salary");
    assert_eq!(categories[8]["id"], "default_other_expense");
    assert_eq!(categories[9]["id"], created["id"]);
    assert_eq!(categories[9]["name"], "Pets");
}

#[tokio::test]
async fn builtin_categories_cannot_be_deleted() {
    let server = test_server();
    register(&server, "foo@bar.baz").await;

    let response = server
        .delete(&format_endpoint(endpoints::CATEGORY, "default_salary"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn referenced_categories_cannot_be_deleted() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;
    let user_id = user_id_of(&registration);

    let created = server
        .post(endpoints::CATEGORIES)
        .json(&json!({
            "userId": user_id,
            "name": "Pets",
            "icon": "🐈",
            "color": "#FF9800",
            "type": "expense"
        }))
        .await
        .json::<Value>();
    let category_id = created["id"].as_str().unwrap().to_owned();

    post_transaction(
        &server,
        json!({
            "userId": user_id,
            "accountId": first_account_id_of(&registration),
            "categoryId": category_id,
            "amount": 5.0,
            "type": "expense",
            "date": "2024-01-10"
        }),
    )
    .await;

    let response = server
        .delete(&format_endpoint(endpoints::CATEGORY, &category_id))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // The category is still in the catalog.
    let list = server
        .get(endpoints::CATEGORIES)
        .add_query_param("userId", user_id)
        .await
        .json::<Value>();
    assert_eq!(list.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn unreferenced_categories_delete_cleanly() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;
    let user_id = user_id_of(&registration);

    let created = server
        .post(endpoints::CATEGORIES)
        .json(&json!({
            "userId": user_id,
            "name": "Pets",
            "icon": "🐈",
            "color": "#FF9800",
            "type": "expense"
        }))
        .await
        .json::<Value>();
    let category_id = created["id"].as_str().unwrap();

    server
        .delete(&format_endpoint(endpoints::CATEGORY, category_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let list = server
        .get(endpoints::CATEGORIES)
        .add_query_param("userId", user_id)
        .await
        .json::<Value>();
    assert_eq!(list.as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn stats_document_covers_totals_categories_and_months() {
    let server = test_server();
    let registration = register(&server, "foo@bar.baz").await;
    let user_id = user_id_of(&registration);
    let account_id = first_account_id_of(&registration);

    post_transaction(
        &server,
        json!({
            "userId": user_id,
            "accountId": account_id,
            "categoryId": "default_salary",
            "amount": 1000.0,
            "type": "income",
            "date": "2024-01-15"
        }),
    )
    .await;
    post_transaction(
        &server,
        json!({
            "userId": user_id,
            "accountId": account_id,
            "categoryId": "default_products",
            "amount": 300.0,
            "type": "expense",
            "date": "2024-02-10"
        }),
    )
    .await;

    let response = server
        .get(endpoints::STATS)
        .add_query_param("userId", user_id)
        .add_query_param("start", "2024-01-01")
        .add_query_param("end", "2024-02-29")
        .await;

    response.assert_status_ok();
    let stats = response.json::<Value>();

    assert_eq!(stats["totals"]["income"], json!(1000.0));
    assert_eq!(stats["totals"]["expense"], json!(300.0));
    assert_eq!(stats["totals"]["net"], json!(700.0));

    let income_buckets = stats["incomeByCategory"].as_array().unwrap();
    assert_eq!(income_buckets.len(), 1);
    assert_eq!(income_buckets[0]["categoryId"], "default_salary");
    assert_eq!(income_buckets[0]["total"], json!(1000.0));

    let expense_buckets = stats["expenseByCategory"].as_array().unwrap();
    assert_eq!(expense_buckets.len(), 1);
    assert_eq!(expense_buckets[0]["categoryId"], "default_products");

    assert_eq!(
        stats["monthly"],
        json!([
            { "label": "Jan 2024", "income": 1000.0, "expense": 0.0 },
            { "label": "Feb 2024", "income": 0.0, "expense": 300.0 }
        ])
    );
}
