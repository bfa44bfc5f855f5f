use crate::record::BlogRecord;
use chrono::NaiveDate;
use serde::Deserialize;

/// Inclusive calendar-date bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Every set clause must hold for a record to pass.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlogFilter {
    /// Passes when the record shares at least one tag.
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub author: Option<String>,
    pub has_location: Option<bool>,
    pub date_range: Option<DateRange>,
}

impl BlogFilter {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tags: vec![tag.into()],
            ..Self::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn featured() -> Self {
        Self {
            featured: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &BlogRecord) -> bool {
        if !self.tags.is_empty() && !record.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if let Some(category) = &self.category {
            if record.category.as_ref() != Some(category) {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if record.featured != featured {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if &record.author != author {
                return false;
            }
        }
        if let Some(has_location) = self.has_location {
            if record.has_coordinates() != has_location {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if range.is_bounded() {
                match record.parsed_date() {
                    Some(date) if range.contains(date) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}
