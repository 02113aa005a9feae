use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::validation::SLUG_REGEX;

/// Request DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "Category name must be 1-255 characters"))]
    pub category_name: String,

    /// Derived from `categoryName` when omitted
    #[validate(
        length(max = 255, message = "slug must be at most 255 characters"),
        regex(path = *SLUG_REGEX, message = "slug must be lowercase alphanumeric words separated by single hyphens")
    )]
    pub slug: Option<String>,
}

/// Request DTO for updating a category (absent fields are kept)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "Category name must be 1-255 characters"))]
    pub category_name: Option<String>,

    #[validate(
        length(max = 255, message = "slug must be at most 255 characters"),
        regex(path = *SLUG_REGEX, message = "slug must be lowercase alphanumeric words separated by single hyphens")
    )]
    pub slug: Option<String>,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    pub id: i32,
    pub category_name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            category_name: c.category_name,
            slug: c.slug,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Category attributes embedded in a doc (name and slug only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummaryDto {
    pub category_name: String,
    pub slug: String,
}

impl From<&Category> for CategorySummaryDto {
    fn from(c: &Category) -> Self {
        Self {
            category_name: c.category_name.clone(),
            slug: c.slug.clone(),
        }
    }
}
