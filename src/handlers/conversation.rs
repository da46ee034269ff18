use crate::error::{AppError, AppResult};
use crate::middleware::auth::{parse_user_id, require_admin};
use crate::middleware::AuthUser;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::conversation::ConversationService;
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
pub struct SendMessageRequest {
    /// Message body
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/conversations",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "The user's support conversation (created on first use)", body = crate::models::ConversationModel),
        (status = 400, description = "No admin available", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "conversations"
)]
pub async fn start_conversation(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = ConversationService::new(db);
    let conversation = service.get_or_create(user_id).await?;

    Ok(ApiResponse::ok(conversation))
}

#[utoipa::path(
    get,
    path = "/api/v1/conversations",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Conversations visible to the requester", body = PaginatedResponse<crate::services::conversation::ConversationWithCounterpart>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "conversations"
)]
pub async fn list_conversations(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;
    let is_admin = require_admin(&db, &auth_user).await.is_ok();
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ConversationService::new(db);
    let (conversations, total) = service.list(user_id, is_admin, page, per_page).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        conversations,
        total,
        page,
        per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/conversations/{id}/messages",
    security(("jwt_token" = [])),
    params(
        ("id" = i32, Path, description = "Conversation ID"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Messages, oldest first", body = PaginatedResponse<crate::models::MessageModel>),
        (status = 403, description = "Not a participant", body = AppError),
        (status = 404, description = "Conversation not found", body = AppError),
    ),
    tag = "conversations"
)]
pub async fn list_messages(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(50).min(200);

    let service = ConversationService::new(db);
    let (messages, total) = service.messages(id, user_id, page, per_page).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        messages, total, page, per_page,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/messages",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Conversation ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message sent", body = crate::models::MessageModel),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not a participant", body = AppError),
        (status = 404, description = "Conversation not found", body = AppError),
    ),
    tag = "conversations"
)]
pub async fn send_message(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = parse_user_id(&auth_user)?;

    let service = ConversationService::new(db);
    let message = service.send(id, user_id, &payload.content).await?;

    Ok(ApiResponse::ok(message))
}
