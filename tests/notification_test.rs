mod common;

use serde_json::Value;

#[tokio::test]
async fn unread_count_and_mark_read() {
    let app = common::spawn_app().await;
    let (_uid, token) = common::create_test_user(&app, "nt_user").await;

    // Reporting an item produces one notification
    common::create_test_item(&app, &token, "lost").await;

    let resp = app
        .client
        .get(app.url("/notifications/unread-count"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["count"].as_u64().unwrap(), 1);

    let resp = app
        .client
        .get(app.url("/notifications"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["items"][0]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["items"][0]["is_read"], false);

    let resp = app
        .client
        .put(app.url(&format!("/notifications/{}/read", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/notifications/unread-count"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["count"].as_u64().unwrap(), 0);
}

#[tokio::test]
async fn mark_all_read() {
    let app = common::spawn_app().await;
    let (_uid, token) = common::create_test_user(&app, "nt_bulk").await;

    common::create_test_item(&app, &token, "lost").await;
    common::create_test_item(&app, &token, "found").await;

    let resp = app
        .client
        .put(app.url("/notifications/read-all"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["marked_read"].as_u64().unwrap(), 2);
}

#[tokio::test]
async fn cannot_touch_someone_elses_notification() {
    let app = common::spawn_app().await;
    let (_uid_a, token_a) = common::create_test_user(&app, "nt_owner").await;
    let (_uid_b, token_b) = common::create_test_user(&app, "nt_intruder").await;

    common::create_test_item(&app, &token_a, "lost").await;

    let resp = app
        .client
        .get(app.url("/notifications"))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["items"][0]["id"].as_i64().unwrap();

    let resp = app
        .client
        .put(app.url(&format!("/notifications/{}/read", id)))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .delete(app.url(&format!("/notifications/{}", id)))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn delete_one_and_delete_all() {
    let app = common::spawn_app().await;
    let (_uid, token) = common::create_test_user(&app, "nt_clear").await;

    common::create_test_item(&app, &token, "lost").await;
    common::create_test_item(&app, &token, "found").await;

    let resp = app
        .client
        .get(app.url("/notifications"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["items"][0]["id"].as_i64().unwrap();

    let resp = app
        .client
        .delete(app.url(&format!("/notifications/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .delete(app.url("/notifications"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["deleted"].as_u64().unwrap(), 1);

    let resp = app
        .client
        .get(app.url("/notifications"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"].as_u64().unwrap(), 0);
}
