use crate::record::BlogRecord;
use chrono::NaiveDate;
use serde::Deserialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Title,
    Featured,
    Author,
    Category,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SortOptions {
    pub by: SortField,
    pub order: SortOrder,
}

impl SortOptions {
    pub fn new(by: SortField, order: SortOrder) -> Self {
        Self { by, order }
    }
}

/// Undated records sort as the Unix epoch.
fn date_key(record: &BlogRecord) -> NaiveDate {
    record.parsed_date().unwrap_or_default()
}

/// Case-insensitive first, raw text as tie-break.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare(a: &BlogRecord, b: &BlogRecord, field: SortField) -> Ordering {
    match field {
        SortField::Date => date_key(a).cmp(&date_key(b)),
        SortField::Title => collate(&a.title, &b.title),
        SortField::Featured => a.featured.cmp(&b.featured),
        SortField::Author => collate(&a.author, &b.author),
        SortField::Category => collate(
            a.category.as_deref().unwrap_or(""),
            b.category.as_deref().unwrap_or(""),
        ),
    }
}

/// Stable: ties keep their input order in either direction.
pub fn sort_records(records: &mut [BlogRecord], options: SortOptions) {
    records.sort_by(|a, b| {
        let ord = compare(a, b, options.by);
        match options.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}
