//! Catalog store - data access for categories, docs and code snippets
//!
//! Services talk to a `CatalogStore` trait object. `PgCatalogStore` is the
//! production backend; `MemoryCatalogStore` keeps everything in process and
//! mirrors the relational rules of the schema (cascades, unique slugs,
//! foreign keys) so the services behave the same on both.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::categories::models::{Category, CategoryChanges, NewCategory};
use crate::features::docs::models::{Code, Doc, DocChanges, NewCode, NewDoc, SlugEntry};

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

/// Ordering for main doc listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainDocOrder {
    /// Ascending surrogate key
    Id,
    /// Ascending category id, uncategorized last, ties by id
    CategoryId,
}

impl MainDocOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            MainDocOrder::Id => "id ASC",
            MainDocOrder::CategoryId => "category_id ASC NULLS LAST, id ASC",
        }
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    // Categories

    /// All categories ordered by name
    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Categories whose id is in `ids`, ascending id
    async fn find_categories(&self, ids: &[i32]) -> Result<Vec<Category>>;

    /// Category slugs starting with `prefix`
    async fn category_slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    async fn insert_category(&self, category: NewCategory) -> Result<Category>;

    async fn update_category(&self, id: i32, changes: CategoryChanges)
        -> Result<Option<Category>>;

    /// Deletes the category; its docs become uncategorized
    async fn delete_category(&self, id: i32) -> Result<bool>;

    // Docs

    /// Main docs (no parent), optionally restricted to one category
    async fn list_main_docs(
        &self,
        order: MainDocOrder,
        category_id: Option<i32>,
    ) -> Result<Vec<Doc>>;

    async fn find_doc(&self, id: i32) -> Result<Option<Doc>>;

    async fn find_doc_by_slug(&self, slug: &str) -> Result<Option<Doc>>;

    /// Variants of any of `parent_ids`, ascending id
    async fn list_variants(&self, parent_ids: &[i32]) -> Result<Vec<Doc>>;

    /// Doc slugs starting with `prefix`
    async fn doc_slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Inserts a doc together with its snippets as one atomic write.
    ///
    /// When `doc.parent_id` is set the parent must exist (NotFound) and must
    /// itself be a main doc (BadRequest).
    async fn insert_doc(&self, doc: NewDoc, codes: Vec<NewCode>) -> Result<Doc>;

    async fn update_doc(&self, id: i32, changes: DocChanges) -> Result<Option<Doc>>;

    /// Deletes the doc, its snippets and its variants (with their snippets)
    async fn delete_doc(&self, id: i32) -> Result<bool>;

    /// Main docs joined with their category, by category name (missing last), then id
    async fn list_slug_entries(&self) -> Result<Vec<SlugEntry>>;

    // Codes

    /// Snippets owned by any of `doc_ids`, optionally only one language, ascending id
    async fn list_codes(&self, doc_ids: &[i32], language: Option<&str>) -> Result<Vec<Code>>;
}
