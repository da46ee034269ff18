mod common;

use serde_json::Value;

#[tokio::test]
async fn register_and_login() {
    let app = common::spawn_app().await;

    // Register
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["success"].as_bool().unwrap());
    assert!(body["data"]["token"].as_str().is_some());
    let token = body["data"]["token"].as_str().unwrap();

    // Login with the email
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": "alice@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(body["data"]["role"], "user");

    // Get current user
    let resp = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn register_duplicate_email_fails() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "name": "Bob",
            "email": "bob@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Same email, different name
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "name": "Robert",
            "email": "bob@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_wrong_password_fails() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "name": "Charlie",
            "email": "charlie@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": "charlie@example.com",
            "password": "wrong_password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn change_password_then_old_password_fails() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "name": "Dave",
            "email": "dave@example.com",
            "password": "test_password_123"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let resp = app
        .client
        .put(app.url("/auth/password"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "current_password": "test_password_123",
            "new_password": "brand_new_password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Old password no longer works
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": "dave@example.com",
            "password": "test_password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // New one does
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": "dave@example.com",
            "password": "brand_new_password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn forgot_password_is_silent_for_unknown_email() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/forgot-password"))
        .json(&serde_json::json!({ "email": "nobody@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn reset_password_with_mailed_token() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "name": "Heidi",
            "email": "heidi@example.com",
            "password": "forgettable_pw_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .post(app.url("/auth/forgot-password"))
        .json(&serde_json::json!({ "email": "heidi@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The token the reset email would carry
    let token = common::user_token_column(&app.db, "heidi@example.com", "password_reset_token")
        .await
        .expect("reset token should be set");

    let resp = app
        .client
        .post(app.url("/auth/reset-password"))
        .json(&serde_json::json!({
            "token": token,
            "new_password": "unforgettable_pw_2"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Old password is gone
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": "heidi@example.com",
            "password": "forgettable_pw_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // New one works
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": "heidi@example.com",
            "password": "unforgettable_pw_2"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn reset_password_with_bad_token_fails() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/reset-password"))
        .json(&serde_json::json!({
            "token": "made-up-token",
            "new_password": "whatever_pw_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn refresh_token_rotation() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "name": "Erin",
            "email": "erin@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let refresh_token = body["data"]["refresh_token"].as_str().unwrap().to_string();

    // First refresh succeeds and returns new tokens
    let resp = app
        .client
        .post(app.url("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let new_refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, refresh_token);

    // The consumed token is dead
    let resp = app
        .client
        .post(app.url("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // The replacement still works
    let resp = app
        .client
        .post(app.url("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": new_refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn access_token_rejected_as_refresh_token() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "frank").await;

    let resp = app
        .client
        .post(app.url("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn protected_route_requires_token() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn logout_clears_cookies() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "grace").await;

    let resp = app
        .client
        .post(app.url("/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let cookies: Vec<_> = resp
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("access_token=;")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=;")));
}
