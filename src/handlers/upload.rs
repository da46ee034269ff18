use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::upload::{UploadConfig, UploadService};
use axum::{extract::Multipart, response::IntoResponse, Extension};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

/// Upload an item photo.
/// POST /upload/item-image (multipart form: field "file")
#[utoipa::path(
    post,
    path = "/api/v1/upload/item-image",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Image uploaded", body = UploadResponse),
        (status = 400, description = "Invalid file", body = AppError),
        (status = 413, description = "File too large", body = AppError),
    ),
    tag = "upload"
)]
pub async fn upload_item_image(
    Extension(config): Extension<UploadConfig>,
    _auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?;

    let url = UploadService::save_file(&config, &data, &content_type, "items").await?;

    Ok(ApiResponse::ok(UploadResponse { url }))
}
