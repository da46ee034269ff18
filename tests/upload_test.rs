mod common;

use serde_json::Value;

const FIVE_MB: usize = 5 * 1024 * 1024;

fn png_bytes(total_len: usize) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(total_len.max(data.len()), 0);
    data
}

fn jpeg_bytes(total_len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.resize(total_len.max(data.len()), 0);
    data
}

async fn upload(
    app: &common::TestApp,
    token: &str,
    data: Vec<u8>,
    filename: &str,
    content_type: &str,
) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(data)
        .file_name(filename.to_string())
        .mime_str(content_type)
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    app.client
        .post(app.url("/upload/item-image"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn upload_png_returns_public_url() {
    let app = common::spawn_app().await;
    let (_uid, token) = common::create_test_user(&app, "up_png").await;

    let resp = upload(&app, &token, png_bytes(2048), "photo.png", "image/png").await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/items/"), "unexpected url: {}", url);
    assert!(url.ends_with(".png"), "unexpected url: {}", url);
}

#[tokio::test]
async fn upload_larger_than_default_body_limit_succeeds() {
    let app = common::spawn_app().await;
    let (_uid, token) = common::create_test_user(&app, "up_big").await;

    // 3 MB: over axum's default 2 MB body limit, under the 5 MB cap
    let resp = upload(
        &app,
        &token,
        jpeg_bytes(3 * 1024 * 1024),
        "big.jpg",
        "image/jpeg",
    )
    .await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn upload_over_five_megabytes_rejected() {
    let app = common::spawn_app().await;
    let (_uid, token) = common::create_test_user(&app, "up_huge").await;

    let resp = upload(
        &app,
        &token,
        jpeg_bytes(FIVE_MB + 10 * 1024),
        "huge.jpg",
        "image/jpeg",
    )
    .await;
    assert_eq!(resp.status(), 413);
}

#[tokio::test]
async fn upload_unsupported_type_rejected() {
    let app = common::spawn_app().await;
    let (_uid, token) = common::create_test_user(&app, "up_pdf").await;

    let resp = upload(
        &app,
        &token,
        b"%PDF-1.4 not an image".to_vec(),
        "doc.pdf",
        "application/pdf",
    )
    .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn upload_mismatched_magic_bytes_rejected() {
    let app = common::spawn_app().await;
    let (_uid, token) = common::create_test_user(&app, "up_fake").await;

    // PNG bytes declared as jpeg
    let resp = upload(&app, &token, png_bytes(2048), "fake.jpg", "image/jpeg").await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn upload_requires_auth() {
    let app = common::spawn_app().await;

    let part = reqwest::multipart::Part::bytes(png_bytes(1024))
        .file_name("photo.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = app
        .client
        .post(app.url("/upload/item-image"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
