use crate::error::{AppError, AppResult};
use crate::middleware::auth::{parse_user_id, require_admin};
use crate::middleware::AuthUser;
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::item::{ItemFilter, ItemService, ItemWithReporter, NewItem};
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    /// Item name (2-100 characters, must contain a letter)
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    /// Free-text description
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    /// Category, e.g. "electronics", "documents"
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    /// "lost" or "found"
    pub kind: String,
    /// Where the item was lost or found
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    /// Date the item was lost or found (YYYY-MM-DD)
    pub date_incident: chrono::NaiveDate,
    /// How to reach the reporter
    #[validate(length(min = 1, max = 255))]
    pub contact_info: String,
    /// Question a genuine owner should be able to answer
    #[validate(length(min = 1, max = 1000))]
    pub security_question: String,
    /// Optional image URL from a prior upload
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemListQuery {
    pub category: Option<String>,
    /// "lost" or "found"
    pub kind: Option<String>,
    /// "pending" or "claimed"
    pub status: Option<String>,
    /// Substring filter on the location
    pub location: Option<String>,
    /// Case-insensitive search over name, description and location
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/v1/items",
    security(("jwt_token" = [])),
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Item reported successfully", body = crate::models::ItemModel),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "items"
)]
pub async fn create_item(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateItemRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let user_id = parse_user_id(&auth_user)?;

    let service = ItemService::new(db);
    let item = service
        .create(
            user_id,
            NewItem {
                name: payload.name,
                description: payload.description,
                category: payload.category,
                kind: payload.kind,
                location: payload.location,
                date_incident: payload.date_incident,
                contact_info: payload.contact_info,
                security_question: payload.security_question,
                image_url: payload.image_url,
            },
        )
        .await?;

    Ok(ApiResponse::ok(item))
}

#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("kind" = Option<String>, Query, description = "Filter by kind (lost/found)"),
        ("status" = Option<String>, Query, description = "Filter by status (pending/claimed)"),
        ("location" = Option<String>, Query, description = "Substring filter on location"),
        ("search" = Option<String>, Query, description = "Free-text search"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "List of items", body = PaginatedResponse<ItemWithReporter>),
    ),
    tag = "items"
)]
pub async fn list_items(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<ItemListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let filter = ItemFilter {
        category: params.category,
        kind: params.kind,
        status: params.status,
        location: params.location,
        search: params.search,
    };

    let service = ItemService::new(db);
    let (items, total) = service.list_public(&filter, page, per_page).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item detail", body = ItemWithReporter),
        (status = 404, description = "Item not found", body = AppError),
    ),
    tag = "items"
)]
pub async fn get_item(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = ItemService::new(db);
    let item = service.get_by_id(id).await?;
    Ok(ApiResponse::ok(item))
}

#[utoipa::path(
    get,
    path = "/api/v1/items/mine",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Items reported by the current user", body = PaginatedResponse<crate::models::ItemModel>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "items"
)]
pub async fn my_items(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<crate::response::PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ItemService::new(db);
    let (items, total) = service.list_for_user(user_id, page, per_page).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted", body = String),
        (status = 403, description = "Not the reporter or an admin", body = AppError),
        (status = 404, description = "Item not found", body = AppError),
    ),
    tag = "items"
)]
pub async fn delete_item(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;
    let is_admin = require_admin(&db, &auth_user).await.is_ok();

    let service = ItemService::new(db);
    service.delete(id, user_id, is_admin).await?;

    Ok(ApiResponse::ok("Item deleted"))
}
