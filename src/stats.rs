//! Collection-wide statistics.

use crate::record::BlogRecord;
use crate::values::{category_values, distinct_values, tag_values};
use chrono::{NaiveDate, TimeDelta, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_RECENT_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogStats {
    pub total: usize,
    pub published: usize,
    pub drafts: usize,
    pub featured: usize,
    pub with_location: usize,
    pub total_tags: usize,
    pub total_categories: usize,
    pub categories: BTreeMap<String, usize>,
    pub authors: BTreeMap<String, usize>,
    /// Posts dated within the trailing window ending today.
    pub recent_posts: usize,
}

/// Statistics as of now.
pub fn compute(records: &[BlogRecord], recent_days: i64) -> BlogStats {
    compute_at(records, Utc::now().date_naive(), recent_days)
}

pub fn compute_at(records: &[BlogRecord], today: NaiveDate, recent_days: i64) -> BlogStats {
    let window_start = TimeDelta::try_days(recent_days)
        .and_then(|window| today.checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN);
    let mut stats = BlogStats {
        total: records.len(),
        total_tags: distinct_values(tag_values(records)).len(),
        total_categories: distinct_values(category_values(records)).len(),
        ..BlogStats::default()
    };

    for record in records {
        if record.draft {
            stats.drafts += 1;
        } else {
            stats.published += 1;
        }
        if record.featured {
            stats.featured += 1;
        }
        if record.has_coordinates() {
            stats.with_location += 1;
        }
        if let Some(category) = &record.category {
            *stats.categories.entry(category.clone()).or_default() += 1;
        }
        *stats.authors.entry(record.author.clone()).or_default() += 1;
        if record
            .parsed_date()
            .is_some_and(|date| date >= window_start && date <= today)
        {
            stats.recent_posts += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{extract_record, ExtractOptions};

    #[test]
    fn test_compute_at() {
        let records: Vec<BlogRecord> = [
            (
                "---\ndate: 2024-06-20\ncategory: asia\nauthor: Mei\ntags: [food, rail]\nfeatured: true\nlocation:\n  coordinates:\n    lat: 35.0\n    lng: 135.7\n---\n",
                "kyoto.md",
            ),
            (
                "---\ndate: 2024-05-01\ncategory: asia\nauthor: Mei\ntags: [food]\ndraft: true\n---\n",
                "osaka.md",
            ),
            ("---\ndate: 2023-01-01\ncategory: europe\ntags: [rail]\n---\n", "bern.md"),
            ("# Undated", "misc.md"),
        ]
        .iter()
        .map(|(raw, path)| extract_record(raw, path, &ExtractOptions::default()).unwrap())
        .collect();

        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let stats = compute_at(&records, today, DEFAULT_RECENT_DAYS);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.published, 3);
        assert_eq!(stats.drafts, 1);
        assert_eq!(stats.featured, 1);
        assert_eq!(stats.with_location, 1);
        assert_eq!(stats.total_tags, 2);
        assert_eq!(stats.total_categories, 2);
        assert_eq!(stats.categories["asia"], 2);
        assert_eq!(stats.categories["europe"], 1);
        assert_eq!(stats.authors["Mei"], 2);
        assert_eq!(stats.authors["Anonymous"], 2);
        assert_eq!(stats.recent_posts, 1);
    }

    #[test]
    fn test_huge_window_counts_everything_dated() {
        let raw = "---\ndate: 1901-05-05\n---\n";
        let record = extract_record(raw, "old.md", &ExtractOptions::default()).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        let stats = compute_at(&[record], today, 1_000_000_000_000_000);
        assert_eq!(stats.recent_posts, 1);
    }

    #[test]
    fn test_empty_collection() {
        let stats = compute(&[], DEFAULT_RECENT_DAYS);
        assert_eq!(stats, BlogStats::default());
    }
}
