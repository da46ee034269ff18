mod common;

use serde_json::Value;

#[tokio::test]
async fn conversation_requires_an_admin() {
    let app = common::spawn_app().await;
    let (_uid, token) = common::create_test_user(&app, "cv_lonely").await;

    let resp = app
        .client
        .post(app.url("/conversations"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn start_is_idempotent_and_messages_flow() {
    let app = common::spawn_app().await;
    let (admin_id, admin) = common::create_test_user(&app, "cv_admin").await;
    common::make_admin(&app.db, admin_id).await;
    let (_uid, user) = common::create_test_user(&app, "cv_user").await;

    // First call creates the thread
    let resp = app
        .client
        .post(app.url("/conversations"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let conv_id = body["data"]["id"].as_i64().unwrap();

    // Second call returns the same thread
    let resp = app
        .client
        .post(app.url("/conversations"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"].as_i64().unwrap(), conv_id);

    // User sends, admin replies
    let resp = app
        .client
        .post(app.url(&format!("/conversations/{}/messages", conv_id)))
        .bearer_auth(&user)
        .json(&serde_json::json!({ "content": "Hello, I lost my keys" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .post(app.url(&format!("/conversations/{}/messages", conv_id)))
        .bearer_auth(&admin)
        .json(&serde_json::json!({ "content": "We'll keep an eye out" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Messages come back oldest first
    let resp = app
        .client
        .get(app.url(&format!("/conversations/{}/messages", conv_id)))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let messages = body["data"]["items"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "Hello, I lost my keys");
    assert_eq!(messages[1]["content"], "We'll keep an eye out");

    // Thread preview tracks the latest message
    let resp = app
        .client
        .get(app.url("/conversations"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["data"]["items"][0]["last_message"],
        "We'll keep an eye out"
    );
}

#[tokio::test]
async fn outsiders_cannot_read_a_thread() {
    let app = common::spawn_app().await;
    let (admin_id, _admin) = common::create_test_user(&app, "cv_a2").await;
    common::make_admin(&app.db, admin_id).await;
    let (_uid, user) = common::create_test_user(&app, "cv_member").await;
    let (_oid, outsider) = common::create_test_user(&app, "cv_outsider").await;

    let resp = app
        .client
        .post(app.url("/conversations"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let conv_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/conversations/{}/messages", conv_id)))
        .bearer_auth(&outsider)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .post(app.url(&format!("/conversations/{}/messages", conv_id)))
        .bearer_auth(&outsider)
        .json(&serde_json::json!({ "content": "let me in" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn duplicate_thread_for_user_blocked_by_schema() {
    use sea_orm::{ConnectionTrait, Statement};

    let app = common::spawn_app().await;
    let (admin_id, _admin) = common::create_test_user(&app, "cv_a4").await;
    common::make_admin(&app.db, admin_id).await;
    let (user_id, user) = common::create_test_user(&app, "cv_unique").await;

    let resp = app
        .client
        .post(app.url("/conversations"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // A second row for the same user must bounce off the unique index,
    // whatever path tries to write it.
    let result = app
        .db
        .execute(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "INSERT INTO conversations (user_id, admin_id, last_message, last_message_at, created_at) \
             VALUES ($1, $2, '', NOW(), NOW())",
            vec![user_id.into(), admin_id.into()],
        ))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn empty_message_rejected() {
    let app = common::spawn_app().await;
    let (admin_id, _admin) = common::create_test_user(&app, "cv_a3").await;
    common::make_admin(&app.db, admin_id).await;
    let (_uid, user) = common::create_test_user(&app, "cv_empty").await;

    let resp = app
        .client
        .post(app.url("/conversations"))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let conv_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .post(app.url(&format!("/conversations/{}/messages", conv_id)))
        .bearer_auth(&user)
        .json(&serde_json::json!({ "content": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
