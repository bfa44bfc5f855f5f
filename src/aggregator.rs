//! Queries over the whole post collection.
//!
//! Every call re-reads the source and rebuilds its own working set, so an
//! aggregator can be shared freely between concurrent callers.

use crate::archive::{self, ArchiveYear};
use crate::config::AggregatorConfig;
use crate::frontmatter;
use crate::pins::{self, MapPin};
use crate::query::{self, BlogFilter, QueryOptions, SearchOptions, SearchResults, SortOptions};
use crate::record::{extract_record, slug_from_path, validate_record, BlogRecord, ValidationResult};
use crate::source::DocumentSource;
use crate::stats::{self, BlogStats};
use crate::values::{self, ValueCount};
use futures::future::join_all;
use serde::Serialize;

/// A record together with its markdown body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogPost {
    #[serde(flatten)]
    pub record: BlogRecord,
    pub content: String,
}

/// Health of one source document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReport {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// The metadata block was present but ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontmatter_error: Option<String>,
    /// The document could not become a record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
}

impl DocumentReport {
    pub fn is_clean(&self) -> bool {
        self.frontmatter_error.is_none()
            && self.extract_error.is_none()
            && self
                .validation
                .as_ref()
                .is_some_and(|v| v.is_valid && v.warnings.is_empty())
    }
}

pub struct BlogAggregator<S> {
    source: S,
    config: AggregatorConfig,
}

impl<S: DocumentSource> BlogAggregator<S> {
    pub fn new(source: S, config: AggregatorConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// All readable documents; failures are logged and dropped.
    async fn load_documents(&self) -> Vec<(String, String)> {
        let paths = match self.source.paths().await {
            Ok(paths) => paths,
            Err(err) => {
                tracing::warn!("could not list documents: {err}");
                return Vec::new();
            }
        };

        let reads = paths.into_iter().map(|path| async move {
            let result = self.source.read(&path).await;
            (path, result)
        });

        join_all(reads)
            .await
            .into_iter()
            .filter_map(|(path, result)| match result {
                Ok(text) => Some((path, text)),
                Err(err) => {
                    tracing::warn!("dropping {path}: {err}");
                    None
                }
            })
            .collect()
    }

    /// Every extractable record, drafts and invalid ones included, unsorted.
    pub async fn load_records(&self) -> Vec<BlogRecord> {
        let options = self.config.extract_options();
        let records: Vec<BlogRecord> = self
            .load_documents()
            .await
            .into_iter()
            .filter_map(|(path, text)| match extract_record(&text, &path, &options) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!("skipping document: {err}");
                    None
                }
            })
            .collect();
        tracing::debug!("loaded {} records", records.len());
        records
    }

    pub async fn get_all_blog_meta(&self, options: &QueryOptions) -> Vec<BlogRecord> {
        query::run(self.load_records().await, options)
    }

    /// Looks up a post by slug, drafts included.
    pub async fn get_blog_by_slug(&self, slug: &str) -> Option<BlogPost> {
        let (path, text) = self
            .load_documents()
            .await
            .into_iter()
            .find(|(path, _)| slug_from_path(path).as_deref() == Some(slug))?;

        match extract_record(&text, &path, &self.config.extract_options()) {
            Ok(record) => Some(BlogPost {
                record,
                content: frontmatter::parse(&text).content,
            }),
            Err(err) => {
                tracing::warn!("skipping document: {err}");
                None
            }
        }
    }

    pub async fn search_blogs(&self, options: &SearchOptions) -> SearchResults {
        let records = self.get_all_blog_meta(&options.query_options()).await;
        query::search::search(records, options)
    }

    /// Up to `limit` featured posts, newest first.
    pub async fn get_featured_blogs(&self, limit: usize) -> Vec<BlogRecord> {
        let options = QueryOptions {
            filter: BlogFilter::featured(),
            sort: SortOptions::default(),
            ..QueryOptions::default()
        };
        let mut records = self.get_all_blog_meta(&options).await;
        records.truncate(limit);
        records
    }

    pub async fn get_blogs_by_tag(&self, tag: &str) -> Vec<BlogRecord> {
        self.get_all_blog_meta(&QueryOptions::with_filter(BlogFilter::tag(tag)))
            .await
    }

    pub async fn get_blogs_by_category(&self, category: &str) -> Vec<BlogRecord> {
        self.get_all_blog_meta(&QueryOptions::with_filter(BlogFilter::category(category)))
            .await
    }

    pub async fn get_all_tags(&self) -> Vec<String> {
        let records = self.get_all_blog_meta(&QueryOptions::default()).await;
        values::distinct_values(values::tag_values(&records))
    }

    pub async fn get_all_categories(&self) -> Vec<String> {
        let records = self.get_all_blog_meta(&QueryOptions::default()).await;
        values::distinct_values(values::category_values(&records))
    }

    pub async fn get_tags_with_counts(&self, include_drafts: bool) -> Vec<ValueCount> {
        let records = self.counted_records(include_drafts).await;
        values::count_values(values::tag_values(&records))
    }

    pub async fn get_categories_with_counts(&self, include_drafts: bool) -> Vec<ValueCount> {
        let records = self.counted_records(include_drafts).await;
        values::count_values(values::category_values(&records))
    }

    async fn counted_records(&self, include_drafts: bool) -> Vec<BlogRecord> {
        let options = QueryOptions {
            include_drafts,
            ..QueryOptions::default()
        };
        self.get_all_blog_meta(&options).await
    }

    /// Computed over every record, drafts included.
    pub async fn get_blog_stats(&self) -> BlogStats {
        stats::compute(&self.load_records().await, self.config.recent_days)
    }

    pub async fn get_blog_archive(&self) -> Vec<ArchiveYear> {
        archive::build(self.get_all_blog_meta(&QueryOptions::default()).await)
    }

    pub async fn get_blog_map_pins(&self) -> Vec<MapPin> {
        let records = self.get_all_blog_meta(&QueryOptions::default()).await;
        pins::project_all(&records, &self.config.blog_url_prefix)
    }

    /// Per-document report of ignored metadata, extraction failures and validation.
    pub async fn check(&self) -> Vec<DocumentReport> {
        let options = self.config.extract_options();
        let mut reports: Vec<DocumentReport> = self
            .load_documents()
            .await
            .into_iter()
            .map(|(path, text)| {
                let frontmatter_error = frontmatter::parse(&text)
                    .diagnostic
                    .map(|e| e.to_string());
                match extract_record(&text, &path, &options) {
                    Ok(record) => DocumentReport {
                        slug: Some(record.slug.clone()),
                        validation: Some(validate_record(&record)),
                        path,
                        frontmatter_error,
                        extract_error: None,
                    },
                    Err(err) => DocumentReport {
                        path,
                        slug: None,
                        frontmatter_error,
                        extract_error: Some(err.to_string()),
                        validation: None,
                    },
                }
            })
            .collect();
        reports.sort_by(|a, b| a.path.cmp(&b.path));
        reports
    }
}
