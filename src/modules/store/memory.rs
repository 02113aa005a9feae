use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CategoryChanges, NewCategory};
use crate::features::docs::models::{Code, Doc, DocChanges, NewCode, NewDoc, SlugEntry};
use crate::modules::store::{CatalogStore, MainDocOrder};
use crate::shared::constants::{MISSING_REFERENCE, NESTED_VARIANT, PARENT_DOC_NOT_FOUND};

#[derive(Debug, Default)]
struct MemoryState {
    categories: Vec<Category>,
    docs: Vec<Doc>,
    codes: Vec<Code>,
    last_category_id: i32,
    last_doc_id: i32,
    last_code_id: i32,
}

impl MemoryState {
    fn category_exists(&self, id: i32) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    fn check_category_ref(&self, category_id: Option<i32>) -> Result<()> {
        match category_id {
            Some(id) if !self.category_exists(id) => {
                Err(AppError::BadRequest(MISSING_REFERENCE.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// In-process catalog store.
///
/// Rows live in id order inside a single lock, so every write is atomic.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    state: RwLock<MemoryState>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Case-insensitive name order, ties by exact bytes; matches the
/// `LOWER(name) COLLATE "C", name COLLATE "C"` ordering of the postgres store
fn name_order_key(name: &str) -> (String, &str) {
    (name.to_lowercase(), name)
}

/// Category name (missing last), then doc id
fn slug_entry_key(entry: &SlugEntry) -> (bool, Option<(String, &str)>, i32) {
    (
        entry.category_name.is_none(),
        entry.category_name.as_deref().map(name_order_key),
        entry.id,
    )
}

fn doc_conflict() -> AppError {
    AppError::Conflict("A doc with this unique slug already exists.".to_string())
}

fn category_conflict() -> AppError {
    AppError::Conflict("A category with this slug already exists.".to_string())
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| {
            name_order_key(&a.category_name)
                .cmp(&name_order_key(&b.category_name))
                .then(a.id.cmp(&b.id))
        });
        Ok(categories)
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn find_categories(&self, ids: &[i32]) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn category_slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .iter()
            .filter(|c| c.slug.starts_with(prefix))
            .map(|c| c.slug.clone())
            .collect())
    }

    async fn insert_category(&self, category: NewCategory) -> Result<Category> {
        let mut state = self.state.write().await;
        if state.categories.iter().any(|c| c.slug == category.slug) {
            return Err(category_conflict());
        }

        state.last_category_id += 1;
        let now = Utc::now();
        let row = Category {
            id: state.last_category_id,
            category_name: category.category_name,
            slug: category.slug,
            created_at: now,
            updated_at: now,
        };
        state.categories.push(row.clone());
        Ok(row)
    }

    async fn update_category(
        &self,
        id: i32,
        changes: CategoryChanges,
    ) -> Result<Option<Category>> {
        let mut state = self.state.write().await;

        if let Some(ref slug) = changes.slug {
            if state.categories.iter().any(|c| c.id != id && &c.slug == slug) {
                return Err(category_conflict());
            }
        }

        let Some(category) = state.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.category_name {
            category.category_name = name;
        }
        if let Some(slug) = changes.slug {
            category.slug = slug;
        }
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i32) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        if state.categories.len() == before {
            return Ok(false);
        }

        // ON DELETE SET NULL
        for doc in state.docs.iter_mut().filter(|d| d.category_id == Some(id)) {
            doc.category_id = None;
        }
        Ok(true)
    }

    async fn list_main_docs(
        &self,
        order: MainDocOrder,
        category_id: Option<i32>,
    ) -> Result<Vec<Doc>> {
        let state = self.state.read().await;
        let mut docs: Vec<Doc> = state
            .docs
            .iter()
            .filter(|d| !d.is_variant())
            .filter(|d| category_id.is_none() || d.category_id == category_id)
            .cloned()
            .collect();

        if order == MainDocOrder::CategoryId {
            // Stable sort over id order; uncategorized last
            docs.sort_by_key(|d| (d.category_id.is_none(), d.category_id));
        }
        Ok(docs)
    }

    async fn find_doc(&self, id: i32) -> Result<Option<Doc>> {
        let state = self.state.read().await;
        Ok(state.docs.iter().find(|d| d.id == id).cloned())
    }

    async fn find_doc_by_slug(&self, slug: &str) -> Result<Option<Doc>> {
        let state = self.state.read().await;
        Ok(state.docs.iter().find(|d| d.unique_slug == slug).cloned())
    }

    async fn list_variants(&self, parent_ids: &[i32]) -> Result<Vec<Doc>> {
        let state = self.state.read().await;
        Ok(state
            .docs
            .iter()
            .filter(|d| d.parent_id.is_some_and(|p| parent_ids.contains(&p)))
            .cloned()
            .collect())
    }

    async fn doc_slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .docs
            .iter()
            .filter(|d| d.unique_slug.starts_with(prefix))
            .map(|d| d.unique_slug.clone())
            .collect())
    }

    async fn insert_doc(&self, doc: NewDoc, codes: Vec<NewCode>) -> Result<Doc> {
        let mut state = self.state.write().await;

        if let Some(parent_id) = doc.parent_id {
            match state.docs.iter().find(|d| d.id == parent_id) {
                None => return Err(AppError::NotFound(PARENT_DOC_NOT_FOUND.to_string())),
                Some(parent) if parent.is_variant() => {
                    return Err(AppError::BadRequest(NESTED_VARIANT.to_string()))
                }
                Some(_) => {}
            }
        }
        if state.docs.iter().any(|d| d.unique_slug == doc.unique_slug) {
            return Err(doc_conflict());
        }
        state.check_category_ref(doc.category_id)?;

        // Nothing below can fail, so the doc and its snippets land together
        state.last_doc_id += 1;
        let now = Utc::now();
        let row = Doc {
            id: state.last_doc_id,
            ui_name: doc.ui_name,
            ui_subtitle: doc.ui_subtitle,
            docs: doc.docs,
            unique_slug: doc.unique_slug,
            category_id: doc.category_id,
            parent_id: doc.parent_id,
            created_at: now,
            updated_at: now,
        };
        state.docs.push(row.clone());

        for code in codes {
            state.last_code_id += 1;
            let code = Code {
                id: state.last_code_id,
                language: code.language,
                code: code.code,
                doc_id: row.id,
                created_at: now,
                updated_at: now,
            };
            state.codes.push(code);
        }

        Ok(row)
    }

    async fn update_doc(&self, id: i32, changes: DocChanges) -> Result<Option<Doc>> {
        let mut state = self.state.write().await;
        state.check_category_ref(changes.category_id.flatten())?;

        let Some(doc) = state.docs.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(ui_name) = changes.ui_name {
            doc.ui_name = ui_name;
        }
        if let Some(ui_subtitle) = changes.ui_subtitle {
            doc.ui_subtitle = ui_subtitle;
        }
        if let Some(docs) = changes.docs {
            doc.docs = docs;
        }
        if let Some(category_id) = changes.category_id {
            doc.category_id = category_id;
        }
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete_doc(&self, id: i32) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.docs.iter().any(|d| d.id == id) {
            return Ok(false);
        }

        // Cascade: the doc, its variants, and every snippet they own
        let removed: HashSet<i32> = state
            .docs
            .iter()
            .filter(|d| d.id == id || d.parent_id == Some(id))
            .map(|d| d.id)
            .collect();
        state.docs.retain(|d| !removed.contains(&d.id));
        state.codes.retain(|c| !removed.contains(&c.doc_id));
        Ok(true)
    }

    async fn list_slug_entries(&self) -> Result<Vec<SlugEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<SlugEntry> = state
            .docs
            .iter()
            .filter(|d| !d.is_variant())
            .map(|d| {
                let category = d
                    .category_id
                    .and_then(|id| state.categories.iter().find(|c| c.id == id));
                SlugEntry {
                    id: d.id,
                    ui_name: d.ui_name.clone(),
                    unique_slug: d.unique_slug.clone(),
                    category_id: d.category_id,
                    category_name: category.map(|c| c.category_name.clone()),
                    category_slug: category.map(|c| c.slug.clone()),
                }
            })
            .collect();

        entries.sort_by(|a, b| slug_entry_key(a).cmp(&slug_entry_key(b)));
        Ok(entries)
    }

    async fn list_codes(&self, doc_ids: &[i32], language: Option<&str>) -> Result<Vec<Code>> {
        let state = self.state.read().await;
        Ok(state
            .codes
            .iter()
            .filter(|c| doc_ids.contains(&c.doc_id))
            .filter(|c| language.map_or(true, |lang| c.language == lang))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_doc(
        ui_name: &str,
        slug: &str,
        category_id: Option<i32>,
        parent_id: Option<i32>,
    ) -> NewDoc {
        NewDoc {
            ui_name: ui_name.to_string(),
            ui_subtitle: None,
            docs: None,
            unique_slug: slug.to_string(),
            category_id,
            parent_id,
        }
    }

    fn code(language: &str, source: &str) -> NewCode {
        NewCode {
            language: language.to_string(),
            code: source.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_doc_rejects_missing_parent_without_writing() {
        let store = MemoryCatalogStore::new();

        let err = store
            .insert_doc(new_doc("Orphan", "orphan", None, Some(42)), vec![code("jsx", "<a/>")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref m) if m == PARENT_DOC_NOT_FOUND));
        assert!(store.find_doc_by_slug("orphan").await.unwrap().is_none());
        assert!(store.list_codes(&[1], None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_doc_rejects_variant_of_variant() {
        let store = MemoryCatalogStore::new();
        let main = store
            .insert_doc(new_doc("Button", "button", None, None), vec![])
            .await
            .unwrap();
        let variant = store
            .insert_doc(new_doc("Ghost", "ghost", None, Some(main.id)), vec![])
            .await
            .unwrap();

        let err = store
            .insert_doc(new_doc("Deep", "deep", None, Some(variant.id)), vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_insert_doc_unique_slug_and_category_reference() {
        let store = MemoryCatalogStore::new();
        store
            .insert_doc(new_doc("Button", "button", None, None), vec![])
            .await
            .unwrap();

        let dup = store
            .insert_doc(new_doc("Button", "button", None, None), vec![])
            .await
            .unwrap_err();
        assert!(matches!(dup, AppError::Conflict(_)));

        let dangling = store
            .insert_doc(new_doc("Card", "card", Some(9), None), vec![])
            .await
            .unwrap_err();
        assert!(matches!(dangling, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_delete_doc_cascades_to_variants_and_codes() {
        let store = MemoryCatalogStore::new();
        let main = store
            .insert_doc(new_doc("Button", "button", None, None), vec![code("jsx", "<b/>")])
            .await
            .unwrap();
        let variant = store
            .insert_doc(
                new_doc("Ghost", "ghost", None, Some(main.id)),
                vec![code("css", ".ghost {}")],
            )
            .await
            .unwrap();
        let other = store
            .insert_doc(new_doc("Card", "card", None, None), vec![code("jsx", "<c/>")])
            .await
            .unwrap();

        assert!(store.delete_doc(main.id).await.unwrap());

        assert!(store.find_doc(main.id).await.unwrap().is_none());
        assert!(store.find_doc(variant.id).await.unwrap().is_none());
        let remaining = store
            .list_codes(&[main.id, variant.id, other.id], None)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].doc_id, other.id);

        assert!(!store.delete_doc(main.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_category_uncategorizes_docs() {
        let store = MemoryCatalogStore::new();
        let category = store
            .insert_category(NewCategory {
                category_name: "Buttons".to_string(),
                slug: "buttons".to_string(),
            })
            .await
            .unwrap();
        let doc = store
            .insert_doc(new_doc("Button", "button", Some(category.id), None), vec![])
            .await
            .unwrap();

        assert!(store.delete_category(category.id).await.unwrap());

        let doc = store.find_doc(doc.id).await.unwrap().unwrap();
        assert_eq!(doc.category_id, None);
    }

    #[tokio::test]
    async fn test_list_main_docs_by_category_puts_uncategorized_last() {
        let store = MemoryCatalogStore::new();
        for (name, slug) in [("Forms", "forms"), ("Alerts", "alerts")] {
            store
                .insert_category(NewCategory {
                    category_name: name.to_string(),
                    slug: slug.to_string(),
                })
                .await
                .unwrap();
        }
        store.insert_doc(new_doc("A", "a", None, None), vec![]).await.unwrap();
        store.insert_doc(new_doc("B", "b", Some(2), None), vec![]).await.unwrap();
        store.insert_doc(new_doc("C", "c", Some(1), None), vec![]).await.unwrap();
        store.insert_doc(new_doc("D", "d", Some(2), None), vec![]).await.unwrap();

        let ordered: Vec<String> = store
            .list_main_docs(MainDocOrder::CategoryId, None)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.unique_slug)
            .collect();
        assert_eq!(ordered, vec!["c", "b", "d", "a"]);

        let only_two = store
            .list_main_docs(MainDocOrder::Id, Some(2))
            .await
            .unwrap();
        assert_eq!(only_two.len(), 2);
    }

    #[tokio::test]
    async fn test_update_doc_can_clear_nullable_fields() {
        let store = MemoryCatalogStore::new();
        let category = store
            .insert_category(NewCategory {
                category_name: "Cards".to_string(),
                slug: "cards".to_string(),
            })
            .await
            .unwrap();
        let mut doc = new_doc("Card", "card", Some(category.id), None);
        doc.ui_subtitle = Some("Surface".to_string());
        doc.docs = Some("Body".to_string());
        let doc = store.insert_doc(doc, vec![]).await.unwrap();

        let updated = store
            .update_doc(
                doc.id,
                DocChanges {
                    ui_subtitle: Some(None),
                    category_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.ui_subtitle, None);
        assert_eq!(updated.category_id, None);
        assert_eq!(updated.docs.as_deref(), Some("Body"));
    }

    #[tokio::test]
    async fn test_category_names_sort_case_insensitively() {
        let store = MemoryCatalogStore::new();
        for (name, slug) in [("buttons", "buttons"), ("Alerts", "alerts"), ("alerts", "alerts-2")] {
            store
                .insert_category(NewCategory {
                    category_name: name.to_string(),
                    slug: slug.to_string(),
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.category_name)
            .collect();

        assert_eq!(names, vec!["Alerts", "alerts", "buttons"]);
    }

    #[tokio::test]
    async fn test_slugs_with_prefix() {
        let store = MemoryCatalogStore::new();
        for slug in ["button", "button-2", "badge"] {
            store
                .insert_doc(new_doc("x", slug, None, None), vec![])
                .await
                .unwrap();
        }

        let mut slugs = store.doc_slugs_with_prefix("button").await.unwrap();
        slugs.sort();

        assert_eq!(slugs, vec!["button", "button-2"]);
    }
}
