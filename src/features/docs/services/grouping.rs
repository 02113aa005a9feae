//! In-memory grouping of the flat slug listing into category buckets

use std::collections::HashMap;

use crate::features::docs::dtos::{SlugBucketCategoryDto, SlugBucketDto, SlugChildDto};
use crate::features::docs::models::SlugEntry;
use crate::shared::constants::{UNCATEGORIZED_ID, UNCATEGORIZED_NAME, UNCATEGORIZED_SLUG};

fn bucket_category(entry: &SlugEntry) -> SlugBucketCategoryDto {
    match (entry.category_id, &entry.category_name, &entry.category_slug) {
        (Some(id), Some(name), Some(slug)) => SlugBucketCategoryDto {
            id: id.to_string(),
            category_name: name.clone(),
            slug: slug.clone(),
        },
        _ => SlugBucketCategoryDto {
            id: UNCATEGORIZED_ID.to_string(),
            category_name: UNCATEGORIZED_NAME.to_string(),
            slug: UNCATEGORIZED_SLUG.to_string(),
        },
    }
}

/// Group entries by category id.
///
/// Buckets appear in first-seen order of the input and children keep their
/// input order; no re-sorting happens here. Entries without a resolvable
/// category share the Uncategorized bucket.
pub fn group_by_category(entries: Vec<SlugEntry>) -> Vec<SlugBucketDto> {
    let mut buckets: Vec<SlugBucketDto> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let category = bucket_category(&entry);
        let position = *index.entry(category.id.clone()).or_insert_with(|| {
            buckets.push(SlugBucketDto {
                category,
                children: Vec::new(),
            });
            buckets.len() - 1
        });

        buckets[position].children.push(SlugChildDto {
            id: entry.id,
            ui_name: entry.ui_name,
            unique_slug: entry.unique_slug,
            category_id: entry.category_id,
        });
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i32, category: Option<(i32, &str)>) -> SlugEntry {
        SlugEntry {
            id,
            ui_name: format!("Doc {}", id),
            unique_slug: format!("doc-{}", id),
            category_id: category.map(|(cid, _)| cid),
            category_name: category.map(|(_, name)| name.to_string()),
            category_slug: category.map(|(_, name)| name.to_lowercase()),
        }
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let buckets = group_by_category(vec![
            entry(3, Some((2, "Buttons"))),
            entry(1, Some((2, "Buttons"))),
            entry(2, Some((1, "Cards"))),
            entry(4, None),
        ]);

        let keys: Vec<&str> = buckets.iter().map(|b| b.category.id.as_str()).collect();
        assert_eq!(keys, vec!["2", "1", "0"]);

        let button_ids: Vec<i32> = buckets[0].children.iter().map(|c| c.id).collect();
        assert_eq!(button_ids, vec![3, 1]);

        assert_eq!(buckets[2].category.category_name, "Uncategorized");
        assert_eq!(buckets[2].category.slug, "uncategorized");
        assert_eq!(buckets[2].children[0].category_id, None);
    }

    #[test]
    fn test_later_entries_join_their_first_bucket() {
        let buckets = group_by_category(vec![
            entry(1, Some((5, "Alerts"))),
            entry(2, None),
            entry(3, Some((5, "Alerts"))),
        ]);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].children.len(), 2);
        assert_eq!(buckets[1].category.id, "0");
    }

    #[test]
    fn test_same_name_different_ids_stay_apart() {
        let buckets = group_by_category(vec![
            entry(1, Some((1, "Misc"))),
            entry(2, Some((2, "Misc"))),
        ]);

        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_category(Vec::new()).is_empty());
    }
}
