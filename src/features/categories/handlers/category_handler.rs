use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::MessageResponse;

/// List all categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List of categories", body = Vec<CategoryResponseDto>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<Vec<CategoryResponseDto>>> {
    let categories = service.list().await?;
    Ok(Json(categories))
}

/// Get category by slug
#[utoipa::path(
    get,
    path = "/api/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category found", body = CategoryResponseDto),
        (status = 404, description = "Category not found", body = MessageResponse)
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryResponseDto>> {
    let category = service.get_by_slug(&slug).await?;
    Ok(Json(category))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryResponseDto),
        (status = 400, description = "Validation error", body = MessageResponse),
        (status = 409, description = "Slug already taken", body = MessageResponse)
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<CategoryResponseDto>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.create(dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponseDto),
        (status = 400, description = "Validation error", body = MessageResponse),
        (status = 404, description = "Category not found", body = MessageResponse),
        (status = 409, description = "Slug already taken", body = MessageResponse)
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<CategoryResponseDto>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.update(id, dto).await?;
    Ok(Json(category))
}

/// Delete a category
///
/// Docs in the category are kept and become uncategorized.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 404, description = "Category not found", body = MessageResponse)
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>> {
    service.delete(id).await?;
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
