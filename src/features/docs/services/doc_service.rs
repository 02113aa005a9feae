use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::docs::dtos::{
    CodeResponseDto, CreateDocDto, DocDetailResponseDto, DocResponseDto, DocWithCodesDto,
    SlugBucketDto, UpdateDocDto,
};
use crate::features::docs::models::{Code, Doc, DocChanges, NewCode, NewDoc};
use crate::features::docs::services::grouping::group_by_category;
use crate::modules::store::{CatalogStore, MainDocOrder};
use crate::shared::constants::{DOC_NOT_FOUND, FALLBACK_DOC_SLUG, SLUG_CONFLICT_RETRIES};
use crate::shared::validation::{first_free_slug, slug_stem, slugify};

/// Service for doc catalog operations
pub struct DocService {
    store: Arc<dyn CatalogStore>,
}

impl DocService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// All main docs by ascending id, with codes, category and variants
    pub async fn list_main_docs(&self) -> Result<Vec<DocDetailResponseDto>> {
        let docs = self.store.list_main_docs(MainDocOrder::Id, None).await?;
        self.load_details(docs, true).await
    }

    pub async fn get_doc(&self, id: i32) -> Result<DocDetailResponseDto> {
        let doc = self
            .store
            .find_doc(id)
            .await?
            .ok_or_else(|| AppError::NotFound(DOC_NOT_FOUND.to_string()))?;

        self.load_detail(doc, true).await
    }

    pub async fn get_doc_by_slug(&self, unique_slug: &str) -> Result<DocDetailResponseDto> {
        let doc = self
            .store
            .find_doc_by_slug(unique_slug)
            .await?
            .ok_or_else(|| AppError::NotFound(DOC_NOT_FOUND.to_string()))?;

        self.load_detail(doc, true).await
    }

    /// Create a doc and its snippets; `parentId` in the payload makes it a variant
    pub async fn create_doc(&self, dto: CreateDocDto) -> Result<DocDetailResponseDto> {
        let parent_id = dto.parent_id;
        self.insert(dto, parent_id).await
    }

    /// Create a UI variant of `parent_id`, ignoring any `parentId` in the payload
    pub async fn create_variant(
        &self,
        parent_id: i32,
        dto: CreateDocDto,
    ) -> Result<DocDetailResponseDto> {
        self.insert(dto, Some(parent_id)).await
    }

    /// Partial update of the mutable fields; returns the doc without associations
    pub async fn update_doc(&self, id: i32, dto: UpdateDocDto) -> Result<DocResponseDto> {
        let changes = DocChanges {
            ui_name: dto.ui_name,
            ui_subtitle: dto.ui_subtitle,
            docs: dto.docs,
            category_id: dto.category_id,
        };

        let doc = self
            .store
            .update_doc(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(DOC_NOT_FOUND.to_string()))?;

        Ok(doc.into())
    }

    /// Delete a doc together with its snippets and variants
    pub async fn delete_doc(&self, id: i32) -> Result<()> {
        if !self.store.delete_doc(id).await? {
            return Err(AppError::NotFound(DOC_NOT_FOUND.to_string()));
        }

        tracing::info!("Doc deleted: id={}", id);
        Ok(())
    }

    /// Main docs grouped into category buckets for navigation
    pub async fn list_grouped_slugs(&self) -> Result<Vec<SlugBucketDto>> {
        let entries = self.store.list_slug_entries().await?;
        Ok(group_by_category(entries))
    }

    /// Main docs by category id, each with only its `language` snippets.
    ///
    /// Docs without a matching snippet are kept with an empty list.
    pub async fn list_docs_with_code(
        &self,
        language: &str,
        category_id: Option<i32>,
    ) -> Result<Vec<DocWithCodesDto>> {
        let docs = self
            .store
            .list_main_docs(MainDocOrder::CategoryId, category_id)
            .await?;

        let ids: Vec<i32> = docs.iter().map(|d| d.id).collect();
        let codes = self.store.list_codes(&ids, Some(language)).await?;
        let mut codes_by_doc = group_codes(codes);

        Ok(docs
            .into_iter()
            .map(|doc| DocWithCodesDto {
                codes: codes_by_doc.remove(&doc.id).unwrap_or_default(),
                doc: doc.into(),
            })
            .collect())
    }

    async fn insert(
        &self,
        dto: CreateDocDto,
        parent_id: Option<i32>,
    ) -> Result<DocDetailResponseDto> {
        let base = dto
            .unique_slug
            .is_none()
            .then(|| slugify(&dto.ui_name, FALLBACK_DOC_SLUG));

        let new_doc = NewDoc {
            ui_name: dto.ui_name,
            ui_subtitle: dto.ui_subtitle,
            docs: dto.docs,
            unique_slug: dto.unique_slug.unwrap_or_default(),
            category_id: dto.category_id,
            parent_id,
        };
        let codes: Vec<NewCode> = dto.codes.into_iter().map(Into::into).collect();
        let code_count = codes.len();

        let doc = match base {
            Some(base) => self.insert_with_free_slug(&base, new_doc, codes).await?,
            None => self.store.insert_doc(new_doc, codes).await?,
        };

        tracing::info!(
            "Doc created: id={}, slug={}, parent_id={:?}, codes={}",
            doc.id,
            doc.unique_slug,
            doc.parent_id,
            code_count
        );

        self.load_detail(doc, false).await
    }

    /// Insert under the first free candidate of `base`, moving on to the next
    /// one when a concurrent create takes it first
    async fn insert_with_free_slug(
        &self,
        base: &str,
        mut doc: NewDoc,
        codes: Vec<NewCode>,
    ) -> Result<Doc> {
        let mut retries = 0;
        loop {
            let taken: HashSet<String> = self
                .store
                .doc_slugs_with_prefix(slug_stem(base))
                .await?
                .into_iter()
                .collect();
            doc.unique_slug = first_free_slug(base, &taken);

            match self.store.insert_doc(doc.clone(), codes.clone()).await {
                Err(AppError::Conflict(_)) if retries < SLUG_CONFLICT_RETRIES => {
                    tracing::debug!("Slug {} taken concurrently, retrying", doc.unique_slug);
                    retries += 1;
                }
                result => return result,
            }
        }
    }

    async fn load_detail(&self, doc: Doc, with_variants: bool) -> Result<DocDetailResponseDto> {
        let id = doc.id;
        self.load_details(vec![doc], with_variants)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Doc {} vanished while loading", id)))
    }

    /// Attach codes, category summary and (optionally) variants to `docs`, keeping their order
    async fn load_details(
        &self,
        docs: Vec<Doc>,
        with_variants: bool,
    ) -> Result<Vec<DocDetailResponseDto>> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = docs.iter().map(|d| d.id).collect();
        let category_ids: Vec<i32> = docs
            .iter()
            .filter_map(|d| d.category_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let variants_fut = async {
            if with_variants {
                self.store.list_variants(&ids).await
            } else {
                Ok(Vec::new())
            }
        };
        let (variants, categories) =
            futures::try_join!(variants_fut, self.store.find_categories(&category_ids))?;

        let owner_ids: Vec<i32> = ids
            .iter()
            .copied()
            .chain(variants.iter().map(|v| v.id))
            .collect();
        let mut codes_by_doc = group_codes(self.store.list_codes(&owner_ids, None).await?);

        let categories: HashMap<i32, CategorySummaryDto> = categories
            .iter()
            .map(|c| (c.id, CategorySummaryDto::from(c)))
            .collect();

        let mut variants_by_parent: HashMap<i32, Vec<DocWithCodesDto>> = HashMap::new();
        for variant in variants {
            let Some(parent_id) = variant.parent_id else {
                continue;
            };
            variants_by_parent
                .entry(parent_id)
                .or_default()
                .push(DocWithCodesDto {
                    codes: codes_by_doc.remove(&variant.id).unwrap_or_default(),
                    doc: variant.into(),
                });
        }

        Ok(docs
            .into_iter()
            .map(|doc| {
                let ui_variants = with_variants
                    .then(|| variants_by_parent.remove(&doc.id).unwrap_or_default());
                DocDetailResponseDto {
                    codes: codes_by_doc.remove(&doc.id).unwrap_or_default(),
                    category: doc.category_id.and_then(|id| categories.get(&id).cloned()),
                    ui_variants,
                    doc: doc.into(),
                }
            })
            .collect())
    }
}

/// Bucket snippets by owning doc, keeping their id order
fn group_codes(codes: Vec<Code>) -> HashMap<i32, Vec<CodeResponseDto>> {
    let mut grouped: HashMap<i32, Vec<CodeResponseDto>> = HashMap::new();
    for code in codes {
        grouped.entry(code.doc_id).or_default().push(code.into());
    }
    grouped
}
