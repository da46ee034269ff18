mod common;

use serde_json::Value;

#[tokio::test]
async fn report_item_assigns_ref_no_and_notifies() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "reporter").await;

    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Blue Umbrella",
            "description": "Left near the east entrance",
            "category": "accessories",
            "kind": "found",
            "location": "Science Building",
            "date_incident": "2025-05-20",
            "contact_info": "reception",
            "security_question": "What is printed on the handle?"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(body["data"]["status"], "pending");

    // Ref no: prefix from location, 4 random digits, 2-digit counter
    let ref_no = body["data"]["ref_no"].as_str().unwrap();
    let parts: Vec<&str> = ref_no.split('-').collect();
    assert_eq!(parts.len(), 3, "unexpected ref_no: {}", ref_no);
    assert_eq!(parts[0], "S");
    assert_eq!(parts[1].len(), 4);
    assert_eq!(parts[2].len(), 2);

    // Reporter got a confirmation notification
    let resp = app
        .client
        .get(app.url("/notifications"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert!(items
        .iter()
        .any(|n| n["title"] == "Report Submitted" && n["message"].as_str().unwrap().contains(ref_no)));
}

#[tokio::test]
async fn item_name_without_letters_rejected() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "strict").await;

    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "12345",
            "description": "numbers only",
            "category": "misc",
            "kind": "lost",
            "location": "Gym",
            "date_incident": "2025-05-20",
            "contact_info": "n/a",
            "security_question": "?"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn invalid_kind_rejected() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "kinds").await;

    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Red Scarf",
            "description": "wool",
            "category": "clothing",
            "kind": "stolen",
            "location": "Cafeteria",
            "date_incident": "2025-05-20",
            "contact_info": "n/a",
            "security_question": "?"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn public_listing_and_filters() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "lister").await;

    common::create_test_item(&app, &token, "lost").await;
    common::create_test_item(&app, &token, "found").await;

    // Listing needs no auth
    let resp = app.client.get(app.url("/items")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["total"].as_u64().unwrap() >= 2);

    // kind filter
    let resp = app
        .client
        .get(app.url("/items?kind=lost"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    for item in body["data"]["items"].as_array().unwrap() {
        assert_eq!(item["kind"], "lost");
    }

    // search over name/description/location, case-insensitive
    let resp = app
        .client
        .get(app.url("/items?search=wallet"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["total"].as_u64().unwrap() >= 2);

    let resp = app
        .client
        .get(app.url("/items?search=no_such_thing_anywhere"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"].as_u64().unwrap(), 0);
}

#[tokio::test]
async fn item_detail_includes_reporter_name() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "detail").await;
    let item_id = common::create_test_item(&app, &token, "found").await;

    let resp = app
        .client
        .get(app.url(&format!("/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["reporter_name"].as_str().unwrap().starts_with("detail"));
}

#[tokio::test]
async fn my_items_only_shows_own_reports() {
    let app = common::spawn_app().await;
    let (_id_a, token_a) = common::create_test_user(&app, "owner_a").await;
    let (_id_b, token_b) = common::create_test_user(&app, "owner_b").await;

    common::create_test_item(&app, &token_a, "lost").await;
    common::create_test_item(&app, &token_b, "found").await;

    let resp = app
        .client
        .get(app.url("/items/mine"))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"].as_u64().unwrap(), 1);
    assert_eq!(body["data"]["items"][0]["kind"], "lost");
}

#[tokio::test]
async fn only_reporter_or_admin_can_delete() {
    let app = common::spawn_app().await;
    let (_id_a, token_a) = common::create_test_user(&app, "del_owner").await;
    let (_id_b, token_b) = common::create_test_user(&app, "del_other").await;
    let (admin_id, admin_token) = common::create_test_user(&app, "del_admin").await;
    common::make_admin(&app.db, admin_id).await;

    let item_one = common::create_test_item(&app, &token_a, "lost").await;
    let item_two = common::create_test_item(&app, &token_a, "lost").await;

    // A stranger can't delete
    let resp = app
        .client
        .delete(app.url(&format!("/items/{}", item_one)))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // The reporter can
    let resp = app
        .client
        .delete(app.url(&format!("/items/{}", item_one)))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // An admin can
    let resp = app
        .client
        .delete(app.url(&format!("/items/{}", item_two)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}
