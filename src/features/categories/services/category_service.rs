use std::collections::HashSet;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::{Category, CategoryChanges, NewCategory};
use crate::modules::store::CatalogStore;
use crate::shared::constants::{
    CATEGORY_NOT_FOUND, FALLBACK_CATEGORY_SLUG, SLUG_CONFLICT_RETRIES,
};
use crate::shared::validation::{first_free_slug, slug_stem, slugify};

/// Service for category operations
pub struct CategoryService {
    store: Arc<dyn CatalogStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// List all categories ordered by name
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.store.list_categories().await?;
        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        self.store
            .find_category_by_slug(slug)
            .await?
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(CATEGORY_NOT_FOUND.to_string()))
    }

    /// Create a category, deriving a free slug from the name when none is given
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let category = match dto.slug {
            Some(slug) => {
                self.store
                    .insert_category(NewCategory {
                        category_name: dto.category_name,
                        slug,
                    })
                    .await?
            }
            None => self.insert_with_free_slug(dto.category_name).await?,
        };

        tracing::info!(
            "Category created: id={}, slug={}",
            category.id,
            category.slug
        );

        Ok(category.into())
    }

    pub async fn update(&self, id: i32, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let changes = CategoryChanges {
            category_name: dto.category_name,
            slug: dto.slug,
        };

        self.store
            .update_category(id, changes)
            .await?
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(CATEGORY_NOT_FOUND.to_string()))
    }

    /// Delete a category; its docs stay, uncategorized
    pub async fn delete(&self, id: i32) -> Result<()> {
        if !self.store.delete_category(id).await? {
            return Err(AppError::NotFound(CATEGORY_NOT_FOUND.to_string()));
        }

        tracing::info!("Category deleted: id={}", id);
        Ok(())
    }

    async fn insert_with_free_slug(&self, category_name: String) -> Result<Category> {
        let base = slugify(&category_name, FALLBACK_CATEGORY_SLUG);
        let mut retries = 0;
        loop {
            let taken: HashSet<String> = self
                .store
                .category_slugs_with_prefix(slug_stem(&base))
                .await?
                .into_iter()
                .collect();
            let category = NewCategory {
                category_name: category_name.clone(),
                slug: first_free_slug(&base, &taken),
            };

            match self.store.insert_category(category).await {
                Err(AppError::Conflict(_)) if retries < SLUG_CONFLICT_RETRIES => retries += 1,
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::store::MemoryCatalogStore;

    fn service() -> CategoryService {
        CategoryService::new(Arc::new(MemoryCatalogStore::new()))
    }

    fn create_dto(name: &str, slug: Option<&str>) -> CreateCategoryDto {
        CreateCategoryDto {
            category_name: name.to_string(),
            slug: slug.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_derives_distinct_slugs() {
        let service = service();

        let first = service.create(create_dto("Form Inputs", None)).await.unwrap();
        let second = service.create(create_dto("Form inputs", None)).await.unwrap();

        assert_eq!(first.slug, "form-inputs");
        assert_eq!(second.slug, "form-inputs-2");
    }

    #[tokio::test]
    async fn test_explicit_duplicate_slug_conflicts() {
        let service = service();
        service
            .create(create_dto("Buttons", Some("buttons")))
            .await
            .unwrap();

        let err = service
            .create(create_dto("More Buttons", Some("buttons")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_category() {
        let service = service();

        let update = service
            .update(
                7,
                UpdateCategoryDto {
                    category_name: Some("Nope".to_string()),
                    slug: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(update, AppError::NotFound(_)));

        let delete = service.delete(7).await.unwrap_err();
        assert!(matches!(delete, AppError::NotFound(ref m) if m == CATEGORY_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let service = service();
        for name in ["Tables", "Alerts", "Modals"] {
            service.create(create_dto(name, None)).await.unwrap();
        }

        let names: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.category_name)
            .collect();

        assert_eq!(names, vec!["Alerts", "Modals", "Tables"]);
    }

    #[tokio::test]
    async fn test_long_names_get_slugs_within_column_width() {
        let service = service();
        let name = "n".repeat(255);

        let first = service.create(create_dto(&name, None)).await.unwrap();
        let second = service.create(create_dto(&name, None)).await.unwrap();

        assert_eq!(first.slug.len(), 255);
        assert!(second.slug.len() <= 255);
        assert!(second.slug.ends_with("-2"));
    }

    #[tokio::test]
    async fn test_concurrent_creates_pick_distinct_slugs() {
        let service = service();

        let (a, b) = tokio::join!(
            service.create(create_dto("Modals", None)),
            service.create(create_dto("Modals", None)),
        );

        let mut slugs = vec![a.unwrap().slug, b.unwrap().slug];
        slugs.sort();
        assert_eq!(slugs, vec!["modals", "modals-2"]);
    }
}
