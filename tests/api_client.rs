// API client against an in-process stub of the bank backend
#![cfg(feature = "client")]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use family_bank::{
    AccountType, ApiClient, ApiError, ClientConfig, NewCheckingAccount, SplitEntry, SplitError,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Stub {
    received: Arc<Mutex<Vec<Value>>>,
    cookies: Arc<Mutex<Vec<String>>>,
}

async fn list_accounts(State(stub): State<Stub>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(cookie) = headers.get("cookie").and_then(|v| v.to_str().ok()) {
        stub.cookies.lock().unwrap().push(cookie.to_string());
    }
    Json(json!([
        {"id": 1, "user_id": 1, "account_type": "parent_vault", "balance": 999999999.0,
         "nickname": null, "is_default": 0, "owner_name": "Mom & Dad"},
        {"id": 4, "user_id": 2, "account_type": "checking", "balance": 5.0,
         "nickname": "Spend", "is_default": 1, "owner_name": "Test Kid"},
        {"id": 6, "user_id": 2, "account_type": "savings", "balance": 3.0,
         "nickname": "Savings", "is_default": 1, "owner_name": "Test Kid"}
    ]))
}

async fn list_allowances() -> impl IntoResponse {
    Json(json!([
        {"id": 3, "user_id": 2, "display_name": "Test Kid", "username": "testkid",
         "amount": 10.0, "frequency": "weekly", "target_account_type": "checking",
         "day_of_week": 0, "next_payment_date": "2026-10-19", "active": 1}
    ]))
}

async fn get_splits(Path(id): Path<i64>) -> impl IntoResponse {
    if id != 3 {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Config not found"}))).into_response();
    }
    Json(json!([
        {"id": 1, "allowance_config_id": 3, "account_id": 4, "percentage": 70.0,
         "nickname": "Spend", "account_type": "checking", "balance": 5.0},
        {"id": 2, "allowance_config_id": 3, "account_id": 6, "percentage": 30.0,
         "nickname": "Savings", "account_type": "savings", "balance": 3.0}
    ]))
    .into_response()
}

async fn put_splits(State(stub): State<Stub>, Json(body): Json<Value>) -> impl IntoResponse {
    stub.received.lock().unwrap().push(body);
    Json(json!({"success": true, "message": "Allowance splits updated successfully"}))
}

async fn create_checking(State(stub): State<Stub>, Json(body): Json<Value>) -> impl IntoResponse {
    stub.received.lock().unwrap().push(body);
    (
        StatusCode::CONFLICT,
        Json(json!({"error": "A checking account with this nickname already exists"})),
    )
}

async fn set_default() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>Internal Server Error</html>")
}

async fn delete_account(Path(id): Path<i64>) -> impl IntoResponse {
    Json(json!({"success": true, "message": format!("Account {} deleted", id)}))
}

async fn spawn_backend(stub: Stub) -> String {
    let app = Router::new()
        .route("/api/accounts", get(list_accounts))
        .route("/api/accounts/checking", post(create_checking))
        .route("/api/accounts/:id/set-default", post(set_default))
        .route("/api/accounts/:id", delete(delete_account))
        .route("/api/admin/allowances", get(list_allowances))
        .route("/api/admin/allowances/:id/splits", get(get_splits).put(put_splits))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client_for(base_url: String, session: Option<&str>) -> ApiClient {
    ApiClient::new(ClientConfig {
        base_url,
        timeout_secs: 5,
        session_cookie: session.map(str::to_string),
    })
    .unwrap()
}

#[tokio::test]
async fn test_get_accounts_and_allowances() {
    let stub = Stub::default();
    let client = client_for(spawn_backend(stub.clone()).await, Some("parent-session"));

    let accounts = client.get_accounts().await.unwrap();
    assert_eq!(accounts.len(), 3);
    assert_eq!(accounts[0].account_type, AccountType::ParentVault);
    assert!(accounts[1].is_default);
    assert_eq!(accounts[1].display_name(), "Spend ⭐");

    let allowances = client.get_allowances().await.unwrap();
    assert_eq!(allowances[0].rule(), family_bank::RecurrenceRule::weekly(0));

    let cookies = stub.cookies.lock().unwrap().clone();
    assert_eq!(cookies, vec!["session=parent-session".to_string()]);
}

#[tokio::test]
async fn test_get_splits() {
    let client = client_for(spawn_backend(Stub::default()).await, None);

    let splits = client.get_allowance_splits(3).await.unwrap();
    let total: f64 = splits.iter().map(|s| s.percentage).sum();
    assert_eq!(splits.len(), 2);
    assert_eq!(total, 100.0);

    match client.get_allowance_splits(99).await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Config not found");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_splits_drops_zero_entries() {
    let stub = Stub::default();
    let client = client_for(spawn_backend(stub.clone()).await, None);

    let entries = vec![
        SplitEntry::new(4, 60.0),
        SplitEntry::new(5, 0.0),
        SplitEntry::new(6, 40.0),
    ];
    let response = client.update_allowance_splits(3, &entries).await.unwrap();

    assert!(response.success);
    assert_eq!(response.message.as_deref(), Some("Allowance splits updated successfully"));

    let received = stub.received.lock().unwrap().clone();
    assert_eq!(
        received,
        vec![json!({"splits": [
            {"account_id": 4, "percentage": 60.0},
            {"account_id": 6, "percentage": 40.0}
        ]})]
    );
}

#[tokio::test]
async fn test_invalid_splits_never_sent() {
    let stub = Stub::default();
    let client = client_for(spawn_backend(stub.clone()).await, None);

    let result = client
        .update_allowance_splits(3, &[SplitEntry::new(4, 60.0), SplitEntry::new(6, 39.9)])
        .await;
    assert!(matches!(result, Err(ApiError::Split(SplitError::TotalMismatch { .. }))));

    let result = client.update_allowance_splits(3, &[SplitEntry::new(4, 0.0)]).await;
    assert!(matches!(result, Err(ApiError::Split(SplitError::NoAccountsSelected))));

    assert!(stub.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_message_surfaces() {
    let stub = Stub::default();
    let client = client_for(spawn_backend(stub.clone()).await, None);

    let err = client
        .create_checking_account(&NewCheckingAccount {
            user_id: Some(2),
            nickname: "  Spend ".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "A checking account with this nickname already exists");
    assert_eq!(
        stub.received.lock().unwrap().clone(),
        vec![json!({"user_id": 2, "nickname": "Spend"})]
    );
}

#[tokio::test]
async fn test_non_json_error_falls_back() {
    let client = client_for(spawn_backend(Stub::default()).await, None);

    match client.set_default_account(4).await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Something went wrong");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_account() {
    let client = client_for(spawn_backend(Stub::default()).await, None);

    let response = client.delete_account(7).await.unwrap();
    assert_eq!(response.message.as_deref(), Some("Account 7 deleted"));
}

#[tokio::test]
async fn test_unreachable_backend() {
    // Grab a free port, then close it again
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(format!("http://{}", addr), None);
    let err = client.get_accounts().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.user_message(), "Network error");
}
