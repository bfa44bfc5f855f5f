use super::{BlogFilter, QueryOptions, SortOptions};
use crate::record::BlogRecord;
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Case-insensitive substring matched against title, description and tags.
    pub query: Option<String>,
    pub filter: BlogFilter,
    pub sort: SortOptions,
    pub include_drafts: bool,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl SearchOptions {
    pub fn term(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            include_drafts: self.include_drafts,
            filter: self.filter.clone(),
            sort: self.sort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub blogs: Vec<BlogRecord>,
    /// Matches before pagination.
    pub total: usize,
    pub has_more: bool,
    pub offset: usize,
    pub limit: Option<usize>,
}

pub fn matches_term(record: &BlogRecord, term: &str) -> bool {
    let needle = term.to_lowercase();
    record.title.to_lowercase().contains(&needle)
        || record.description.to_lowercase().contains(&needle)
        || record
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

/// Narrow an already filtered and sorted list by the search term, then page it.
pub fn search(records: Vec<BlogRecord>, options: &SearchOptions) -> SearchResults {
    let matched: Vec<BlogRecord> = match options.query.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => records
            .into_iter()
            .filter(|r| matches_term(r, term))
            .collect(),
        _ => records,
    };

    let total = matched.len();
    let page: Vec<BlogRecord> = matched
        .into_iter()
        .skip(options.offset)
        .take(options.limit.unwrap_or(usize::MAX))
        .collect();
    let has_more = options.offset + page.len() < total;

    SearchResults {
        blogs: page,
        total,
        has_more,
        offset: options.offset,
        limit: options.limit,
    }
}
