use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::docs::models::{Code, Doc, NewCode};
use crate::shared::validation::SLUG_REGEX;

// =============================================================================
// REQUESTS
// =============================================================================

/// One snippet in a create request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CodeInputDto {
    /// Free-text language tag, e.g. "jsx", "css", "tailwind"
    #[validate(length(min = 1, max = 50, message = "Code language must be 1-50 characters"))]
    pub language: String,

    pub code: String,
}

impl From<CodeInputDto> for NewCode {
    fn from(c: CodeInputDto) -> Self {
        Self {
            language: c.language,
            code: c.code,
        }
    }
}

/// `codes` that is missing, null, or not an array means "no snippets".
/// Entries of an array must still be well-formed.
fn lenient_codes<'de, D>(deserializer: D) -> Result<Vec<CodeInputDto>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

/// Keeps "explicit null" apart from "absent": a present field becomes
/// `Some(value)`, `null` included; `#[serde(default)]` covers absence.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request DTO for creating a doc or a UI variant
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocDto {
    #[validate(length(min = 1, max = 255, message = "uiName must be 1-255 characters"))]
    pub ui_name: String,

    pub ui_subtitle: Option<String>,

    /// Long-form documentation body
    pub docs: Option<String>,

    /// Generated from `uiName` when omitted
    #[validate(
        length(max = 255, message = "uniqueSlug must be at most 255 characters"),
        regex(path = *SLUG_REGEX, message = "uniqueSlug must be lowercase alphanumeric words separated by single hyphens")
    )]
    pub unique_slug: Option<String>,

    pub category_id: Option<i32>,

    /// Ignored by the create-variant endpoint, which takes the parent from the path
    pub parent_id: Option<i32>,

    #[serde(default, deserialize_with = "lenient_codes")]
    #[validate(nested)]
    pub codes: Vec<CodeInputDto>,
}

/// Request DTO for updating a doc. `parentId` and `uniqueSlug` are not accepted.
///
/// An explicit `null` clears `uiSubtitle`, `docs` or `categoryId`; an absent
/// field keeps its value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocDto {
    #[validate(length(min = 1, max = 255, message = "uiName must be 1-255 characters"))]
    pub ui_name: Option<String>,

    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub ui_subtitle: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub docs: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i32>)]
    pub category_id: Option<Option<i32>>,
}

/// Query params for the code listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DocsWithCodeQuery {
    /// Only snippets with exactly this language tag (default: "tailwind")
    pub language: Option<String>,

    /// Restrict to docs in one category
    pub category_id: Option<i32>,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Doc fields without associations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocResponseDto {
    pub id: i32,
    pub ui_name: String,
    pub ui_subtitle: Option<String>,
    pub docs: Option<String>,
    pub unique_slug: String,
    pub category_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Doc> for DocResponseDto {
    fn from(d: Doc) -> Self {
        Self {
            id: d.id,
            ui_name: d.ui_name,
            ui_subtitle: d.ui_subtitle,
            docs: d.docs,
            unique_slug: d.unique_slug,
            category_id: d.category_id,
            parent_id: d.parent_id,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeResponseDto {
    pub id: i32,
    pub language: String,
    pub code: String,
    pub doc_id: i32,
}

impl From<Code> for CodeResponseDto {
    fn from(c: Code) -> Self {
        Self {
            id: c.id,
            language: c.language,
            code: c.code,
            doc_id: c.doc_id,
        }
    }
}

/// Doc with its snippets (variants, code listing)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocWithCodesDto {
    #[serde(flatten)]
    pub doc: DocResponseDto,
    pub codes: Vec<CodeResponseDto>,
}

/// Doc with snippets, category and (for reads) its UI variants
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocDetailResponseDto {
    #[serde(flatten)]
    pub doc: DocResponseDto,
    pub codes: Vec<CodeResponseDto>,
    pub category: Option<CategorySummaryDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_variants: Option<Vec<DocWithCodesDto>>,
}

/// Category key of a slug bucket; id is "0" for the Uncategorized bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlugBucketCategoryDto {
    pub id: String,
    pub category_name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlugChildDto {
    pub id: i32,
    pub ui_name: String,
    pub unique_slug: String,
    pub category_id: Option<i32>,
}

/// Main docs of one category, for navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SlugBucketDto {
    pub category: SlugBucketCategoryDto,
    pub children: Vec<SlugChildDto>,
}
