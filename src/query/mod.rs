//! Filtering, sorting and search over the record collection.

pub mod filter;
pub mod search;
pub mod sort;

pub use filter::{BlogFilter, DateRange};
pub use search::{SearchOptions, SearchResults};
pub use sort::{sort_records, SortField, SortOptions, SortOrder};

use crate::record::{validate_record, BlogRecord};

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub include_drafts: bool,
    pub filter: BlogFilter,
    pub sort: SortOptions,
}

impl QueryOptions {
    pub fn with_filter(filter: BlogFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// Draft exclusion, validation exclusion, filter, then sort.
pub fn run(records: Vec<BlogRecord>, options: &QueryOptions) -> Vec<BlogRecord> {
    let mut selected: Vec<BlogRecord> = records
        .into_iter()
        .filter(|r| options.include_drafts || !r.draft)
        .filter(|r| {
            let result = validate_record(r);
            if !result.is_valid {
                tracing::debug!(
                    slug = %r.slug,
                    errors = ?result.errors,
                    "excluding invalid record"
                );
            }
            result.is_valid
        })
        .filter(|r| options.filter.matches(r))
        .collect();
    sort_records(&mut selected, options.sort);
    selected
}
