use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{handle_db_error, AppError, Result};
use crate::features::categories::models::{Category, CategoryChanges, NewCategory};
use crate::features::docs::models::{Code, Doc, DocChanges, NewCode, NewDoc, SlugEntry};
use crate::modules::store::{CatalogStore, MainDocOrder};
use crate::shared::constants::{NESTED_VARIANT, PARENT_DOC_NOT_FOUND};

const CATEGORY_COLUMNS: &str = "id, category_name, slug, created_at, updated_at";

const DOC_COLUMNS: &str =
    "id, ui_name, ui_subtitle, docs, unique_slug, category_id, parent_id, created_at, updated_at";

const CODE_COLUMNS: &str = "id, language, code, doc_id, created_at, updated_at";

/// PostgreSQL-backed catalog store
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl std::fmt::Debug for PgCatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCatalogStore")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let query = format!(
            r#"SELECT {} FROM categories ORDER BY LOWER(category_name) COLLATE "C", category_name COLLATE "C", id"#,
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let query = format!(
            "SELECT {} FROM categories WHERE slug = $1",
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn find_categories(&self, ids: &[i32]) -> Result<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {} FROM categories WHERE id = ANY($1) ORDER BY id ASC",
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn category_slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT slug FROM categories WHERE starts_with(slug, $1)")
            .bind(prefix)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn insert_category(&self, category: NewCategory) -> Result<Category> {
        let query = format!(
            r#"
            INSERT INTO categories (category_name, slug)
            VALUES ($1, $2)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .bind(category.category_name)
            .bind(category.slug)
            .fetch_one(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn update_category(
        &self,
        id: i32,
        changes: CategoryChanges,
    ) -> Result<Option<Category>> {
        let query = format!(
            r#"
            UPDATE categories
            SET category_name = COALESCE($1, category_name),
                slug = COALESCE($2, slug),
                updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .bind(changes.category_name)
            .bind(changes.slug)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn delete_category(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(handle_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_main_docs(
        &self,
        order: MainDocOrder,
        category_id: Option<i32>,
    ) -> Result<Vec<Doc>> {
        let query = format!(
            r#"
            SELECT {}
            FROM docs
            WHERE parent_id IS NULL
              AND ($1::INTEGER IS NULL OR category_id = $1)
            ORDER BY {}
            "#,
            DOC_COLUMNS,
            order.as_sql()
        );

        sqlx::query_as::<_, Doc>(&query)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn find_doc(&self, id: i32) -> Result<Option<Doc>> {
        let query = format!("SELECT {} FROM docs WHERE id = $1", DOC_COLUMNS);

        sqlx::query_as::<_, Doc>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn find_doc_by_slug(&self, slug: &str) -> Result<Option<Doc>> {
        let query = format!("SELECT {} FROM docs WHERE unique_slug = $1", DOC_COLUMNS);

        sqlx::query_as::<_, Doc>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn list_variants(&self, parent_ids: &[i32]) -> Result<Vec<Doc>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {} FROM docs WHERE parent_id = ANY($1) ORDER BY id ASC",
            DOC_COLUMNS
        );

        sqlx::query_as::<_, Doc>(&query)
            .bind(parent_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn doc_slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT unique_slug FROM docs WHERE starts_with(unique_slug, $1)",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(handle_db_error)
    }

    async fn insert_doc(&self, doc: NewDoc, codes: Vec<NewCode>) -> Result<Doc> {
        // Dropping the transaction on any early return rolls it back
        let mut tx = self.pool.begin().await.map_err(handle_db_error)?;

        if let Some(parent_id) = doc.parent_id {
            // FOR SHARE keeps the parent from being deleted until we commit
            let parent: Option<(i32, Option<i32>)> =
                sqlx::query_as("SELECT id, parent_id FROM docs WHERE id = $1 FOR SHARE")
                    .bind(parent_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(handle_db_error)?;

            match parent {
                None => return Err(AppError::NotFound(PARENT_DOC_NOT_FOUND.to_string())),
                Some((_, Some(_))) => return Err(AppError::BadRequest(NESTED_VARIANT.to_string())),
                Some(_) => {}
            }
        }

        let query = format!(
            r#"
            INSERT INTO docs (ui_name, ui_subtitle, docs, unique_slug, category_id, parent_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            DOC_COLUMNS
        );

        let inserted = sqlx::query_as::<_, Doc>(&query)
            .bind(doc.ui_name)
            .bind(doc.ui_subtitle)
            .bind(doc.docs)
            .bind(doc.unique_slug)
            .bind(doc.category_id)
            .bind(doc.parent_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(handle_db_error)?;

        if !codes.is_empty() {
            let (languages, sources): (Vec<String>, Vec<String>) =
                codes.into_iter().map(|c| (c.language, c.code)).unzip();

            sqlx::query(
                r#"
                INSERT INTO codes (language, code, doc_id)
                SELECT t.language, t.code, $3
                FROM UNNEST($1::TEXT[], $2::TEXT[]) WITH ORDINALITY AS t(language, code, ord)
                ORDER BY t.ord
                "#,
            )
            .bind(languages)
            .bind(sources)
            .bind(inserted.id)
            .execute(&mut *tx)
            .await
            .map_err(handle_db_error)?;
        }

        tx.commit().await.map_err(handle_db_error)?;

        Ok(inserted)
    }

    async fn update_doc(&self, id: i32, changes: DocChanges) -> Result<Option<Doc>> {
        // Nullable columns take a "set" flag so an explicit null clears them
        let query = format!(
            r#"
            UPDATE docs
            SET ui_name = COALESCE($1, ui_name),
                ui_subtitle = CASE WHEN $2 THEN $3 ELSE ui_subtitle END,
                docs = CASE WHEN $4 THEN $5 ELSE docs END,
                category_id = CASE WHEN $6 THEN $7 ELSE category_id END,
                updated_at = NOW()
            WHERE id = $8
            RETURNING {}
            "#,
            DOC_COLUMNS
        );

        sqlx::query_as::<_, Doc>(&query)
            .bind(changes.ui_name)
            .bind(changes.ui_subtitle.is_some())
            .bind(changes.ui_subtitle.flatten())
            .bind(changes.docs.is_some())
            .bind(changes.docs.flatten())
            .bind(changes.category_id.is_some())
            .bind(changes.category_id.flatten())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn delete_doc(&self, id: i32) -> Result<bool> {
        // codes.doc_id and docs.parent_id both cascade
        let result = sqlx::query("DELETE FROM docs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(handle_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_slug_entries(&self) -> Result<Vec<SlugEntry>> {
        sqlx::query_as::<_, SlugEntry>(
            r#"
            SELECT d.id, d.ui_name, d.unique_slug, d.category_id,
                   c.category_name, c.slug AS category_slug
            FROM docs d
            LEFT JOIN categories c ON c.id = d.category_id
            WHERE d.parent_id IS NULL
            ORDER BY LOWER(c.category_name) COLLATE "C" NULLS LAST, c.category_name COLLATE "C", d.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(handle_db_error)
    }

    async fn list_codes(&self, doc_ids: &[i32], language: Option<&str>) -> Result<Vec<Code>> {
        if doc_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            r#"
            SELECT {}
            FROM codes
            WHERE doc_id = ANY($1)
              AND ($2::TEXT IS NULL OR language = $2)
            ORDER BY id ASC
            "#,
            CODE_COLUMNS
        );

        sqlx::query_as::<_, Code>(&query)
            .bind(doc_ids)
            .bind(language)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }
}

// Run with a reachable server: DATABASE_URL=postgres://... cargo test -- --ignored
#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::MISSING_REFERENCE;

    fn new_doc(slug: &str, category_id: Option<i32>, parent_id: Option<i32>) -> NewDoc {
        NewDoc {
            ui_name: slug.to_uppercase(),
            ui_subtitle: Some("subtitle".to_string()),
            docs: Some("body".to_string()),
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

    async fn category(store: &PgCatalogStore, name: &str, slug: &str) -> Category {
        store
            .insert_category(NewCategory {
                category_name: name.to_string(),
                slug: slug.to_string(),
            })
            .await
            .unwrap()
    }

    async fn count(pool: &PgPool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn test_failed_code_insert_rolls_back_the_doc(pool: PgPool) {
        let store = PgCatalogStore::new(pool.clone());
        let too_long_language = "x".repeat(60);

        let err = store
            .insert_doc(
                new_doc("button", None, None),
                vec![code("jsx", "<Button />"), code(&too_long_language, "?")],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(count(&pool, "docs").await, 0);
        assert_eq!(count(&pool, "codes").await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn test_parent_checks_write_nothing(pool: PgPool) {
        let store = PgCatalogStore::new(pool.clone());

        let missing = store
            .insert_doc(new_doc("orphan", None, Some(77)), vec![code("jsx", "<a/>")])
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound(ref m) if m == PARENT_DOC_NOT_FOUND));

        let main = store.insert_doc(new_doc("button", None, None), vec![]).await.unwrap();
        let variant = store
            .insert_doc(new_doc("ghost", None, Some(main.id)), vec![])
            .await
            .unwrap();
        let nested = store
            .insert_doc(new_doc("deeper", None, Some(variant.id)), vec![])
            .await
            .unwrap_err();
        assert!(matches!(nested, AppError::BadRequest(ref m) if m == NESTED_VARIANT));

        assert_eq!(count(&pool, "docs").await, 2);
        assert_eq!(count(&pool, "codes").await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn test_snippets_keep_request_order(pool: PgPool) {
        let store = PgCatalogStore::new(pool);

        let doc = store
            .insert_doc(
                new_doc("badge", None, None),
                vec![code("tailwind", "px-2"), code("jsx", "<Badge />"), code("css", ".b {}")],
            )
            .await
            .unwrap();

        let languages: Vec<String> = store
            .list_codes(&[doc.id], None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.language)
            .collect();
        assert_eq!(languages, vec!["tailwind", "jsx", "css"]);

        let tailwind = store.list_codes(&[doc.id], Some("tailwind")).await.unwrap();
        assert_eq!(tailwind.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn test_constraint_violations_map_to_client_errors(pool: PgPool) {
        let store = PgCatalogStore::new(pool);
        store.insert_doc(new_doc("button", None, None), vec![]).await.unwrap();

        let duplicate = store
            .insert_doc(new_doc("button", None, None), vec![])
            .await
            .unwrap_err();
        assert!(matches!(duplicate, AppError::Conflict(_)));

        let dangling = store
            .insert_doc(new_doc("card", Some(999), None), vec![])
            .await
            .unwrap_err();
        assert!(matches!(dangling, AppError::BadRequest(ref m) if m == MISSING_REFERENCE));

        category(&store, "Buttons", "buttons").await;
        let slug_taken = store
            .insert_category(NewCategory {
                category_name: "More Buttons".to_string(),
                slug: "buttons".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(slug_taken, AppError::Conflict(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn test_deletes_cascade_and_uncategorize(pool: PgPool) {
        let store = PgCatalogStore::new(pool.clone());
        let cards = category(&store, "Cards", "cards").await;
        let main = store
            .insert_doc(new_doc("card", Some(cards.id), None), vec![code("jsx", "<Card />")])
            .await
            .unwrap();
        store
            .insert_doc(new_doc("card-flat", None, Some(main.id)), vec![code("css", ".flat {}")])
            .await
            .unwrap();
        let other = store
            .insert_doc(new_doc("chip", Some(cards.id), None), vec![])
            .await
            .unwrap();

        assert!(store.delete_doc(main.id).await.unwrap());
        assert!(!store.delete_doc(main.id).await.unwrap());
        assert_eq!(count(&pool, "docs").await, 1);
        assert_eq!(count(&pool, "codes").await, 0);

        assert!(store.delete_category(cards.id).await.unwrap());
        let other = store.find_doc(other.id).await.unwrap().unwrap();
        assert_eq!(other.category_id, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn test_listing_orders_match_the_memory_store(pool: PgPool) {
        let store = PgCatalogStore::new(pool);
        let buttons = category(&store, "buttons", "buttons").await;
        let alerts = category(&store, "Alerts", "alerts").await;
        store.insert_doc(new_doc("loose", None, None), vec![]).await.unwrap();
        store
            .insert_doc(new_doc("toast", Some(alerts.id), None), vec![])
            .await
            .unwrap();
        store
            .insert_doc(new_doc("button", Some(buttons.id), None), vec![])
            .await
            .unwrap();

        let by_category: Vec<String> = store
            .list_main_docs(MainDocOrder::CategoryId, None)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.unique_slug)
            .collect();
        assert_eq!(by_category, vec!["button", "toast", "loose"]);

        let entries: Vec<String> = store
            .list_slug_entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.unique_slug)
            .collect();
        assert_eq!(entries, vec!["toast", "button", "loose"]);

        let names: Vec<String> = store
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.category_name)
            .collect();
        assert_eq!(names, vec!["Alerts", "buttons"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn test_update_sets_and_clears_nullable_columns(pool: PgPool) {
        let store = PgCatalogStore::new(pool);
        let cards = category(&store, "Cards", "cards").await;
        let doc = store
            .insert_doc(new_doc("card", Some(cards.id), None), vec![])
            .await
            .unwrap();

        let cleared = store
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
        assert_eq!(cleared.ui_subtitle, None);
        assert_eq!(cleared.category_id, None);
        assert_eq!(cleared.docs.as_deref(), Some("body"));
        assert_eq!(cleared.ui_name, "CARD");

        let recategorized = store
            .update_doc(
                doc.id,
                DocChanges {
                    category_id: Some(Some(cards.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recategorized.category_id, Some(cards.id));

        assert!(store
            .update_doc(404, DocChanges::default())
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn test_slugs_with_prefix(pool: PgPool) {
        let store = PgCatalogStore::new(pool);
        for slug in ["button", "button-2", "badge"] {
            store.insert_doc(new_doc(slug, None, None), vec![]).await.unwrap();
        }

        let mut slugs = store.doc_slugs_with_prefix("button").await.unwrap();
        slugs.sort();
        assert_eq!(slugs, vec!["button", "button-2"]);
    }
}
