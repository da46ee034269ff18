use crate::error::{AppError, AppResult};
use crate::middleware::auth::{parse_user_id, require_admin};
use crate::middleware::AuthUser;
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::claim::{ClaimService, ClaimWithDetails};
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
pub struct SubmitClaimRequest {
    /// Item being claimed
    pub item_id: i32,
    /// Answer to the item's security question
    #[validate(length(min = 1, max = 1000))]
    pub security_answer: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClaimListQuery {
    /// Filter by status (pending/approved/rejected)
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/v1/claims",
    security(("jwt_token" = [])),
    request_body = SubmitClaimRequest,
    responses(
        (status = 200, description = "Claim submitted", body = crate::models::ClaimModel),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Item not found", body = AppError),
        (status = 409, description = "Item already claimed or duplicate claim", body = AppError),
    ),
    tag = "claims"
)]
pub async fn submit_claim(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<SubmitClaimRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = parse_user_id(&auth_user)?;

    let service = ClaimService::new(db);
    let claim = service
        .submit(payload.item_id, user_id, &payload.security_answer)
        .await?;

    Ok(ApiResponse::ok(claim))
}

#[utoipa::path(
    get,
    path = "/api/v1/claims/mine",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Claims submitted by the current user", body = PaginatedResponse<ClaimWithDetails>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "claims"
)]
pub async fn my_claims(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<crate::response::PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ClaimService::new(db);
    let (claims, total) = service.list_for_user(user_id, page, per_page).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        claims, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/claims",
    security(("jwt_token" = [])),
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "All claims with item and claimant details", body = PaginatedResponse<ClaimWithDetails>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_claims(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<ClaimListQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ClaimService::new(db);
    let (claims, total) = service
        .list(params.status.as_deref(), page, per_page)
        .await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        claims, total, page, per_page,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/claims/{id}/approve",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Claim ID")),
    responses(
        (status = 200, description = "Claim approved", body = crate::models::ClaimModel),
        (status = 400, description = "Claim already resolved", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Claim not found", body = AppError),
        (status = 409, description = "Item already claimed", body = AppError),
    ),
    tag = "admin"
)]
pub async fn approve_claim(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let admin_id = require_admin(&db, &auth_user).await?;

    let service = ClaimService::new(db);
    let claim = service.approve(id, admin_id).await?;

    Ok(ApiResponse::ok(claim))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/claims/{id}/reject",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Claim ID")),
    responses(
        (status = 200, description = "Claim rejected", body = crate::models::ClaimModel),
        (status = 400, description = "Claim already resolved", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Claim not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn reject_claim(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let admin_id = require_admin(&db, &auth_user).await?;

    let service = ClaimService::new(db);
    let claim = service.reject(id, admin_id).await?;

    Ok(ApiResponse::ok(claim))
}
