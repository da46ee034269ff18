#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Once,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        // Tests hammer the API from one IP; the limiter would get in the way.
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        let config = trove::config::jwt::JwtConfig::from_env().unwrap();
        let _ = trove::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations only once globally (using atomic bool for thread safety)
    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        trove::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    // Clean data tables (reverse dependency order)
    cleanup_tables(&db).await;

    let upload_config = trove::services::upload::UploadConfig {
        upload_dir: "./test_uploads".to_string(),
    };
    let email_service = trove::services::email::EmailService::from_env();

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(trove::routes::create_routes())
        .layer(axum::middleware::from_fn(
            trove::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(upload_config))
        .layer(axum::extract::Extension(email_service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let addr_str = format!("http://{}", addr);
    let client = Client::new();

    TestApp {
        addr: addr_str,
        db,
        client,
    }
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = [
        "refresh_tokens",
        "messages",
        "conversations",
        "notifications",
        "claims",
        "items",
        "users",
    ];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// Register a user and return (user_id, token).
pub async fn create_test_user(app: &TestApp, name_prefix: &str) -> (i32, String) {
    static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    let unique_name = format!("{}_{}", name_prefix, counter);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "name": unique_name,
            "email": format!("{}@test.com", unique_name),
            "password": "test_password_123"
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap_or_else(|e| {
        panic!(
            "Failed to parse register response for user '{}': status={}, error={}",
            unique_name, status, e
        );
    });

    if !body["success"].as_bool().unwrap_or(false) {
        panic!(
            "Failed to register user '{}': status={}, body={}",
            unique_name, status, body
        );
    }

    let user_id = body["data"]["user_id"]
        .as_i64()
        .unwrap_or_else(|| panic!("Response missing user_id for user '{}': {:?}", unique_name, body))
        as i32;
    let token = body["data"]["token"]
        .as_str()
        .unwrap_or_else(|| panic!("Response missing token for user '{}': {:?}", unique_name, body))
        .to_string();
    (user_id, token)
}

/// Read a token column straight off a user's row. The API never exposes
/// verification or reset tokens, so tests fetch them like the emails would
/// carry them.
pub async fn user_token_column(
    db: &DatabaseConnection,
    email: &str,
    column: &str,
) -> Option<String> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            format!("SELECT {} FROM users WHERE email = $1", column),
            vec![email.into()],
        ))
        .await
        .expect("Failed to query user")?;
    row.try_get::<Option<String>>("", column)
        .expect("Failed to read token column")
}

/// Make a user admin by directly updating the database.
pub async fn make_admin(db: &DatabaseConnection, user_id: i32) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "UPDATE users SET role = 'admin' WHERE id = $1",
        vec![user_id.into()],
    ))
    .await
    .expect("Failed to make user admin");
}

/// Report an item and return its id.
pub async fn create_test_item(app: &TestApp, token: &str, kind: &str) -> i32 {
    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "name": "Black Wallet",
            "description": "Leather wallet with a broken zipper",
            "category": "accessories",
            "kind": kind,
            "location": "Main Library",
            "date_incident": "2025-06-01",
            "contact_info": "front desk",
            "security_question": "What is inside the wallet?"
        }))
        .send()
        .await
        .expect("Failed to create item");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse item response");

    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create item: status={}, body={}", status, body);
    }

    body["data"]["id"].as_i64().expect("Item response missing id") as i32
}

/// Submit a claim on an item and return the claim id.
pub async fn create_test_claim(app: &TestApp, token: &str, item_id: i32) -> i32 {
    let resp = app
        .client
        .post(app.url("/claims"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "item_id": item_id,
            "security_answer": "A photo and a bus card"
        }))
        .send()
        .await
        .expect("Failed to submit claim");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse claim response");

    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to submit claim: status={}, body={}", status, body);
    }

    body["data"]["id"].as_i64().expect("Claim response missing id") as i32
}
