use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a code snippet, owned by exactly one doc
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Code {
    pub id: i32,
    pub language: String,
    pub code: String,
    pub doc_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snippet to insert alongside its doc
#[derive(Debug, Clone)]
pub struct NewCode {
    pub language: String,
    pub code: String,
}
