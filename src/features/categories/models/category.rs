use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for category
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    pub id: i32,
    pub category_name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new category row
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub category_name: String,
    pub slug: String,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub category_name: Option<String>,
    pub slug: Option<String>,
}
