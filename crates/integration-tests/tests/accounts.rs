//! Account and session flows over HTTP.

use axum::http::StatusCode;
use serde_json::json;

use restock_core::Username;
use restock_integration_tests::TestApp;

#[tokio::test]
async fn test_health_endpoints() {
    let mut app = TestApp::new();
    assert_eq!(app.get("/health").await.status, StatusCode::OK);
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);

    app.gateway().set_unavailable(true);
    assert_eq!(
        app.get("/health/ready").await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_register_logs_in() {
    let mut app = TestApp::new();

    let response = app.register("robin", "correct horse").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "success");

    let state = app.get("/accounts/state").await.json();
    assert_eq!(state, json!({"state": "logged_in", "username": "robin"}));
}

#[tokio::test]
async fn test_register_twice_conflicts_and_keeps_first_account() {
    let mut app = TestApp::new();
    app.register("robin", "first").await;
    let username = Username::parse("robin").unwrap_or_else(|e| panic!("{e}"));
    let before = app.gateway().document(&username).ok().flatten();

    let mut other = app.another_client();
    let response = other.register("robin", "second").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        response.body,
        "Account already exists, try logging in if this is you, or choose a different name"
    );

    assert_eq!(app.gateway().document(&username).ok().flatten(), before);
    let state = other.get("/accounts/state").await.json();
    assert_eq!(state, json!({"state": "logged_out"}));
}

#[tokio::test]
async fn test_register_store_failure() {
    let mut app = TestApp::new();
    app.gateway().fail_next_write();

    let response = app.register("robin", "pw").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        "An error has occured in the registration process"
    );

    let state = app.get("/accounts/state").await.json();
    assert_eq!(state["state"], "logged_out");
}

#[tokio::test]
async fn test_register_empty_username_is_bad_request() {
    let mut app = TestApp::new();
    let response = app.register("   ", "pw").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let mut app = TestApp::new();
    app.register("robin", "right").await;

    let mut other = app.another_client();
    let response = other.login("robin", "wrong").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body,
        "Incorrect login details, review your input or try registering"
    );

    let state = other.get("/accounts/state").await.json();
    assert_eq!(state["state"], "logged_out");
}

#[tokio::test]
async fn test_login_store_failure() {
    let mut app = TestApp::new();
    app.register("robin", "pw").await;
    app.gateway().set_unavailable(true);

    let mut other = app.another_client();
    let response = other.login("robin", "pw").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        "An error has occured in the authentication process"
    );
}

#[tokio::test]
async fn test_logout_ends_session() {
    let mut app = TestApp::new();
    app.register("robin", "pw").await;

    let response = app.post("/accounts/logout", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "success");

    let response = app.post("/items/load", &[]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, "No active session, please log in");
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let mut app = TestApp::new();
    let response = app.post("/accounts/logout", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_clients_have_separate_sessions() {
    let mut robin = TestApp::new();
    let mut alex = robin.another_client();
    robin.register("robin", "pw").await;
    alex.register("alex", "pw").await;

    robin.create_item("tea", "2024-01-01").await;

    assert_eq!(robin.items().await.len(), 1);
    assert!(alex.items().await.is_empty());
    assert_eq!(
        alex.get("/accounts/state").await.json()["username"],
        "alex"
    );
}

#[tokio::test]
async fn test_login_sees_items_from_earlier_session() {
    let mut app = TestApp::new();
    app.register("robin", "pw").await;
    app.create_item("tea", "2024-01-01").await;
    app.post("/accounts/logout", &[]).await;

    let response = app.login("robin", "pw").await;
    assert_eq!(response.status, StatusCode::OK);
    let items = app.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "tea");
}

#[tokio::test]
async fn test_session_is_bound_to_cookie() {
    let mut app = TestApp::new();
    app.register("robin", "pw").await;
    app.forget_cookie();

    let response = app.post("/items/load", &[]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.get("/accounts/state").await.json(),
        json!({"state": "logged_out"})
    );
}

#[tokio::test]
async fn test_register_and_login_with_multipart_form() {
    let mut app = TestApp::new();
    let response = app
        .post_multipart(
            "/accounts/register",
            &[("Username", "robin"), ("Password", "pw")],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "success");

    let mut other = app.another_client();
    let response = other
        .post_multipart("/accounts/login", &[("Username", "robin"), ("Password", "pw")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(other.get("/accounts/state").await.json()["username"], "robin");
}
