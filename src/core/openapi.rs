use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::docs::{dtos as docs_dtos, handlers as docs_handlers};
use crate::shared::types::MessageResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Docs
        docs_handlers::list_docs,
        docs_handlers::get_doc,
        docs_handlers::get_doc_by_slug,
        docs_handlers::list_unique_slugs,
        docs_handlers::list_docs_with_code,
        docs_handlers::create_doc,
        docs_handlers::update_doc,
        docs_handlers::delete_doc,
        docs_handlers::create_variant,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
    ),
    components(
        schemas(
            MessageResponse,
            // Docs
            docs_dtos::CreateDocDto,
            docs_dtos::UpdateDocDto,
            docs_dtos::CodeInputDto,
            docs_dtos::DocResponseDto,
            docs_dtos::CodeResponseDto,
            docs_dtos::DocWithCodesDto,
            docs_dtos::DocDetailResponseDto,
            docs_dtos::SlugBucketDto,
            docs_dtos::SlugBucketCategoryDto,
            docs_dtos::SlugChildDto,
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategorySummaryDto,
        )
    ),
    tags(
        (name = "docs", description = "UI component docs, their code snippets and variants"),
        (name = "categories", description = "Doc categories"),
    ),
    info(
        title = "Doc Catalog API",
        version = "0.1.0",
        description = "API documentation for the UI component doc catalog",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
