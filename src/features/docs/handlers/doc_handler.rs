use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::docs::dtos::{
    CreateDocDto, DocDetailResponseDto, DocResponseDto, DocWithCodesDto, DocsWithCodeQuery,
    SlugBucketDto, UpdateDocDto,
};
use crate::features::docs::services::DocService;
use crate::shared::constants::DEFAULT_CODE_LANGUAGE;
use crate::shared::types::MessageResponse;

/// List main docs with their codes, category and UI variants
#[utoipa::path(
    get,
    path = "/api/docs",
    responses(
        (status = 200, description = "Main docs ordered by id", body = Vec<DocDetailResponseDto>),
    ),
    tag = "docs"
)]
pub async fn list_docs(
    State(service): State<Arc<DocService>>,
) -> Result<Json<Vec<DocDetailResponseDto>>> {
    let docs = service.list_main_docs().await?;
    Ok(Json(docs))
}

/// Get doc by ID
#[utoipa::path(
    get,
    path = "/api/docs/{id}",
    params(
        ("id" = i32, Path, description = "Doc ID")
    ),
    responses(
        (status = 200, description = "Doc found", body = DocDetailResponseDto),
        (status = 404, description = "Doc not found", body = MessageResponse)
    ),
    tag = "docs"
)]
pub async fn get_doc(
    State(service): State<Arc<DocService>>,
    Path(id): Path<i32>,
) -> Result<Json<DocDetailResponseDto>> {
    let doc = service.get_doc(id).await?;
    Ok(Json(doc))
}

/// Get doc by its unique slug
#[utoipa::path(
    get,
    path = "/api/docs/getDocByUniqueSlug/{unique_slug}",
    params(
        ("unique_slug" = String, Path, description = "Doc unique slug")
    ),
    responses(
        (status = 200, description = "Doc found", body = DocDetailResponseDto),
        (status = 404, description = "Doc not found", body = MessageResponse)
    ),
    tag = "docs"
)]
pub async fn get_doc_by_slug(
    State(service): State<Arc<DocService>>,
    Path(unique_slug): Path<String>,
) -> Result<Json<DocDetailResponseDto>> {
    let doc = service.get_doc_by_slug(&unique_slug).await?;
    Ok(Json(doc))
}

/// Main doc slugs grouped by category
#[utoipa::path(
    get,
    path = "/api/docs/unique-slugs",
    responses(
        (status = 200, description = "Slug buckets", body = Vec<SlugBucketDto>),
    ),
    tag = "docs"
)]
pub async fn list_unique_slugs(
    State(service): State<Arc<DocService>>,
) -> Result<Json<Vec<SlugBucketDto>>> {
    let buckets = service.list_grouped_slugs().await?;
    Ok(Json(buckets))
}

/// Main docs with the snippets of one language
#[utoipa::path(
    get,
    path = "/api/docs/with-code",
    params(DocsWithCodeQuery),
    responses(
        (status = 200, description = "Main docs ordered by category", body = Vec<DocWithCodesDto>),
    ),
    tag = "docs"
)]
pub async fn list_docs_with_code(
    State(service): State<Arc<DocService>>,
    Query(query): Query<DocsWithCodeQuery>,
) -> Result<Json<Vec<DocWithCodesDto>>> {
    let language = query
        .language
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_CODE_LANGUAGE.to_string());

    let docs = service
        .list_docs_with_code(&language, query.category_id)
        .await?;
    Ok(Json(docs))
}

/// Create a doc with its code snippets
#[utoipa::path(
    post,
    path = "/api/docs/createDoc",
    request_body = CreateDocDto,
    responses(
        (status = 201, description = "Doc created", body = DocDetailResponseDto),
        (status = 400, description = "Validation error", body = MessageResponse),
        (status = 404, description = "Parent doc not found", body = MessageResponse),
        (status = 409, description = "Slug already taken", body = MessageResponse)
    ),
    tag = "docs"
)]
pub async fn create_doc(
    State(service): State<Arc<DocService>>,
    AppJson(dto): AppJson<CreateDocDto>,
) -> Result<(StatusCode, Json<DocDetailResponseDto>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let doc = service.create_doc(dto).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// Update a doc's name, subtitle, body or category
#[utoipa::path(
    put,
    path = "/api/docs/updateDoc/{id}",
    params(
        ("id" = i32, Path, description = "Doc ID")
    ),
    request_body = UpdateDocDto,
    responses(
        (status = 200, description = "Doc updated", body = DocResponseDto),
        (status = 400, description = "Validation error", body = MessageResponse),
        (status = 404, description = "Doc not found", body = MessageResponse)
    ),
    tag = "docs"
)]
pub async fn update_doc(
    State(service): State<Arc<DocService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<UpdateDocDto>,
) -> Result<Json<DocResponseDto>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let doc = service.update_doc(id, dto).await?;
    Ok(Json(doc))
}

/// Delete a doc along with its codes and variants
#[utoipa::path(
    delete,
    path = "/api/docs/deleteDoc/{id}",
    params(
        ("id" = i32, Path, description = "Doc ID")
    ),
    responses(
        (status = 200, description = "Doc deleted", body = MessageResponse),
        (status = 404, description = "Doc not found", body = MessageResponse)
    ),
    tag = "docs"
)]
pub async fn delete_doc(
    State(service): State<Arc<DocService>>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>> {
    service.delete_doc(id).await?;
    Ok(Json(MessageResponse::new("Doc deleted successfully")))
}

/// Create a UI variant of an existing main doc
#[utoipa::path(
    post,
    path = "/api/docs/createVariant/{id}",
    params(
        ("id" = i32, Path, description = "Parent doc ID")
    ),
    request_body = CreateDocDto,
    responses(
        (status = 201, description = "Variant created", body = DocDetailResponseDto),
        (status = 400, description = "Validation error or nested variant", body = MessageResponse),
        (status = 404, description = "Parent doc not found", body = MessageResponse),
        (status = 409, description = "Slug already taken", body = MessageResponse)
    ),
    tag = "docs"
)]
pub async fn create_variant(
    State(service): State<Arc<DocService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<CreateDocDto>,
) -> Result<(StatusCode, Json<DocDetailResponseDto>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let variant = service.create_variant(id, dto).await?;
    Ok((StatusCode::CREATED, Json(variant)))
}
