use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a doc entry.
///
/// `parent_id = None` marks a main doc; otherwise the row is a UI variant of
/// its parent. Variants never have variants of their own.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Doc {
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

impl Doc {
    pub fn is_variant(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Values for a new doc row
#[derive(Debug, Clone)]
pub struct NewDoc {
    pub ui_name: String,
    pub ui_subtitle: Option<String>,
    pub docs: Option<String>,
    pub unique_slug: String,
    pub category_id: Option<i32>,
    pub parent_id: Option<i32>,
}

/// Partial update of the mutable doc fields.
///
/// `None` keeps a column; `Some(None)` clears a nullable one.
#[derive(Debug, Clone, Default)]
pub struct DocChanges {
    pub ui_name: Option<String>,
    pub ui_subtitle: Option<Option<String>>,
    pub docs: Option<Option<String>>,
    pub category_id: Option<Option<i32>>,
}

/// Main doc projected for the grouped slug listing, joined with its category
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SlugEntry {
    pub id: i32,
    pub ui_name: String,
    pub unique_slug: String,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}
