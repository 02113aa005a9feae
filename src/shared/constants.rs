/// Language used by the code listing when the caller does not pass one
pub const DEFAULT_CODE_LANGUAGE: &str = "tailwind";

// =============================================================================
// UNCATEGORIZED BUCKET
// =============================================================================

/// Bucket id for docs without a category in the grouped slug listing
pub const UNCATEGORIZED_ID: &str = "0";

pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

pub const UNCATEGORIZED_SLUG: &str = "uncategorized";

/// Slug used when a name has no alphanumeric characters to derive one from
pub const FALLBACK_DOC_SLUG: &str = "doc";

pub const FALLBACK_CATEGORY_SLUG: &str = "category";

/// Times a generated slug is re-picked after losing a concurrent insert
pub const SLUG_CONFLICT_RETRIES: u32 = 3;

// =============================================================================
// NOT FOUND / REJECTION MESSAGES
// =============================================================================

pub const DOC_NOT_FOUND: &str = "Doc not found";

pub const PARENT_DOC_NOT_FOUND: &str = "Parent doc not found";

pub const CATEGORY_NOT_FOUND: &str = "Category not found";

pub const NESTED_VARIANT: &str = "A UI variant cannot have variants of its own";

pub const MISSING_REFERENCE: &str = "Referenced record does not exist.";
