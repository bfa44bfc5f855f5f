//! Normalized blog records built from parsed documents.

use crate::error::ExtractError;
use crate::frontmatter::{self, Fields};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_PREVIEW_LENGTH: usize = 150;
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Keys the record derives itself; frontmatter values under these names are dropped.
const RESERVED_KEYS: [&str; 6] = [
    "slug",
    "filePath",
    "file_path",
    "hasFrontmatter",
    "has_frontmatter",
    "content",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<Value>,
}

impl Coordinates {
    pub fn latitude(&self) -> Option<f64> {
        self.lat.as_ref().and_then(coordinate_value)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.lng.as_ref().and_then(coordinate_value)
    }

    /// Both components present and truthy.
    pub fn is_set(&self) -> bool {
        let present = |v: &Option<Value>| v.as_ref().is_some_and(frontmatter::truthy);
        present(&self.lat) && present(&self.lng)
    }
}

fn coordinate_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(flatten)]
    pub extra: Fields,
}

/// One post in the aggregated collection, identified by its slug.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogRecord {
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub draft: bool,
    pub has_frontmatter: bool,
    pub file_path: String,
    /// Metadata keys with no dedicated field.
    #[serde(flatten)]
    pub extra: Fields,
}

impl BlogRecord {
    pub fn has_coordinates(&self) -> bool {
        self.coordinates().is_some_and(Coordinates::is_set)
    }

    pub fn coordinates(&self) -> Option<&Coordinates> {
        self.location.as_ref()?.coordinates.as_ref()
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date)
    }
}

/// Calendar date of a metadata date string.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, naive timestamps and
/// `Month D, YYYY`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            ["%Y/%m/%d", "%B %d, %Y", "%b %d, %Y"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub preview_length: usize,
    pub default_author: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            preview_length: DEFAULT_PREVIEW_LENGTH,
            default_author: DEFAULT_AUTHOR.to_string(),
        }
    }
}

/// File name without directory or `.md` suffix.
pub fn slug_from_path(path: &str) -> Option<String> {
    let name = Path::new(path).file_name()?.to_str()?;
    Some(name.strip_suffix(".md").unwrap_or(name).to_string())
}

/// `lisbon-day-one` -> `Lisbon Day One`
pub fn title_case_slug(slug: &str) -> Option<String> {
    let words: Vec<String> = slug
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").expect("invalid heading regex"));
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("invalid image regex"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("invalid link regex"));
static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(.+?)\*\*|__(.+?)__|\*(.+?)\*").expect("invalid emphasis regex")
});

/// Plain-text preview of markdown content.
pub fn generate_preview(content: &str, max_len: usize) -> String {
    let text = HEADING_RE.replace_all(content, "");
    let text = IMAGE_RE.replace_all(&text, "");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = EMPHASIS_RE.replace_all(&text, "$1$2$3");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.chars().count() <= max_len {
        return text;
    }
    let truncated: String = text.chars().take(max_len).collect();
    format!("{}...", truncated.trim_end())
}

fn take_string(fields: &mut Fields, key: &str) -> Option<String> {
    let value = fields.remove(key)?;
    let s = frontmatter::scalar_to_string(&value)?;
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn take_location(fields: &mut Fields, path: &str) -> Result<Option<Location>, ExtractError> {
    match fields.remove("location") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => Ok(Some(Location {
            name: Some(name),
            ..Location::default()
        })),
        Some(value @ Value::Mapping(_)) => serde_yaml::from_value(value)
            .map(Some)
            .map_err(|source| ExtractError::Location {
                path: path.to_string(),
                source,
            }),
        Some(_) => Err(ExtractError::InvalidLocation {
            path: path.to_string(),
        }),
    }
}

/// Build a record from one source document.
pub fn extract_record(
    raw: &str,
    path: &str,
    options: &ExtractOptions,
) -> Result<BlogRecord, ExtractError> {
    let doc = frontmatter::parse(raw);
    let slug = slug_from_path(path).ok_or_else(|| ExtractError::InvalidPath(path.to_string()))?;
    let mut fields = doc.fields;

    let title = take_string(&mut fields, "title")
        .or_else(|| frontmatter::extract_title_from_content(&doc.content))
        .or_else(|| title_case_slug(&slug))
        .unwrap_or_else(|| "Untitled".to_string());
    let date = take_string(&mut fields, "date")
        .or_else(|| frontmatter::extract_date_from_content(&doc.content));
    let description = take_string(&mut fields, "description")
        .unwrap_or_else(|| generate_preview(&doc.content, options.preview_length));
    let author =
        take_string(&mut fields, "author").unwrap_or_else(|| options.default_author.clone());
    let category = take_string(&mut fields, "category");
    let tags = frontmatter::string_list(fields.remove("tags").as_ref());
    let location = take_location(&mut fields, path)?;
    let featured = fields
        .remove("featured")
        .is_some_and(|v| frontmatter::truthy(&v));
    let draft = fields
        .remove("draft")
        .is_some_and(|v| frontmatter::truthy(&v));
    for key in RESERVED_KEYS {
        if fields.remove(key).is_some() {
            tracing::debug!(%slug, "ignoring reserved frontmatter key `{key}`");
        }
    }

    Ok(BlogRecord {
        slug,
        title,
        date,
        author,
        category,
        description,
        location,
        tags,
        featured,
        draft,
        has_frontmatter: doc.has_frontmatter,
        file_path: path.to_string(),
        extra: fields,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid date shape regex"));

pub fn validate_record(record: &BlogRecord) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if record.title.trim().is_empty() {
        errors.push("missing required field: title".to_string());
    }
    if record.slug.trim().is_empty() {
        errors.push("missing required field: slug".to_string());
    }

    if let Some(coords) = record.coordinates() {
        check_coordinate(&mut errors, "latitude", coords.lat.as_ref(), 90.0);
        check_coordinate(&mut errors, "longitude", coords.lng.as_ref(), 180.0);
    }

    if let Some(date) = &record.date {
        if !ISO_DATE_RE.is_match(date) {
            warnings.push(format!("date `{date}` is not in YYYY-MM-DD format"));
        }
    }

    if record.tags.iter().any(|t| t.trim().is_empty()) {
        warnings.push("tags contain empty values".to_string());
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_coordinate(errors: &mut Vec<String>, name: &str, value: Option<&Value>, bound: f64) {
    match value.and_then(Value::as_f64) {
        Some(v) if (-bound..=bound).contains(&v) => {}
        Some(v) => errors.push(format!("{name} {v} is outside [-{bound}, {bound}]")),
        None => errors.push(format!("{name} must be a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(raw: &str, path: &str) -> BlogRecord {
        extract_record(raw, path, &ExtractOptions::default()).unwrap()
    }

    #[test]
    fn test_full_frontmatter() {
        let raw = "---\ntitle: Lisbon\ndate: 2024-06-01\nauthor: Ana\ncategory: europe\ntags: [food, tram]\nfeatured: true\nlocation:\n  name: Lisbon\n  coordinates:\n    lat: 38.72\n    lng: -9.14\ncost: 420\n---\n# Day one\n\nPastries.";
        let record = extract(raw, "content/blog/lisbon.md");

        assert_eq!(record.slug, "lisbon");
        assert_eq!(record.title, "Lisbon");
        assert_eq!(record.date.as_deref(), Some("2024-06-01"));
        assert_eq!(record.author, "Ana");
        assert_eq!(record.category.as_deref(), Some("europe"));
        assert_eq!(record.tags, vec!["food", "tram"]);
        assert!(record.featured);
        assert!(!record.draft);
        assert!(record.has_frontmatter);
        assert!(record.has_coordinates());
        assert_eq!(record.coordinates().unwrap().latitude(), Some(38.72));
        assert_eq!(record.extra.get("cost").and_then(Value::as_u64), Some(420));
        assert_eq!(record.description, "Day one Pastries.");
        assert_eq!(record.file_path, "content/blog/lisbon.md");
    }

    #[test]
    fn test_legacy_document() {
        let record = extract("# Legacy\n\n*Date: 2024-01-02*\n\nBody text", "old/legacy.md");
        assert_eq!(record.title, "Legacy");
        assert_eq!(record.date.as_deref(), Some("2024-01-02"));
        assert!(!record.has_frontmatter);
        assert_eq!(record.author, DEFAULT_AUTHOR);
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_title_falls_back_to_slug() {
        let record = extract("---\ndraft: true\n---\nno heading", "road-trip_west.md");
        assert_eq!(record.title, "Road Trip West");
        assert!(record.draft);
    }

    #[test]
    fn test_title_falls_back_to_untitled() {
        let record = extract("plain", "---.md");
        assert_eq!(record.title, "Untitled");
    }

    #[test]
    fn test_reserved_keys_do_not_shadow_derived_fields() {
        let record = extract(
            "---\nslug: custom\nfilePath: elsewhere\nhas_frontmatter: false\ncontent: x\nmood: calm\n---\nBody",
            "blog/real.md",
        );
        assert_eq!(record.slug, "real");
        assert_eq!(record.extra.len(), 1);
        assert!(record.extra.contains_key("mood"));

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json.matches("\"slug\"").count(), 1);
        assert_eq!(json.matches("\"filePath\"").count(), 1);
        assert!(json.contains("\"slug\":\"real\""));
        assert!(json.contains("\"filePath\":\"blog/real.md\""));
    }

    #[test]
    fn test_string_location() {
        let record = extract("---\nlocation: Kyoto\n---\n", "kyoto.md");
        let location = record.location.unwrap();
        assert_eq!(location.name.as_deref(), Some("Kyoto"));
        assert!(location.coordinates.is_none());
    }

    #[test]
    fn test_invalid_location_is_an_error() {
        let err = extract_record("---\nlocation: [1, 2]\n---\n", "x.md", &ExtractOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidLocation { .. }));
    }

    #[test]
    fn test_invalid_path_is_an_error() {
        let err = extract_record("# Hi", "..", &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidPath(_)));
    }

    #[test]
    fn test_zero_coordinate_is_not_set() {
        let record = extract(
            "---\nlocation:\n  coordinates:\n    lat: 0\n    lng: 10\n---\n",
            "null-island.md",
        );
        assert!(!record.has_coordinates());
    }

    #[test]
    fn test_generate_preview() {
        let content = "## Heading\n\nSome **bold** and *italic* with a [link](https://x.y).\n![pic](a.png)\nNext line";
        assert_eq!(
            generate_preview(content, 150),
            "Heading Some bold and italic with a link. Next line"
        );
        assert_eq!(generate_preview("abcdefghij", 4), "abcd...");
        assert_eq!(generate_preview("ünïcödé wörds", 7), "ünïcödé...");
    }

    #[test]
    fn test_slug_from_path() {
        assert_eq!(slug_from_path("a/b/c.md").as_deref(), Some("c"));
        assert_eq!(slug_from_path("notes.txt").as_deref(), Some("notes.txt"));
        assert_eq!(slug_from_path(""), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(parse_date("2024-06-01"), expected);
        assert_eq!(parse_date("2024-06-01T10:00:00Z"), expected);
        assert_eq!(parse_date("2024-06-01 08:30:00"), expected);
        assert_eq!(parse_date("June 1, 2024"), expected);
        assert_eq!(parse_date("someday"), None);
    }

    #[test]
    fn test_validate_record() {
        let mut record = extract(
            "---\ndate: 01/02/2024\nlocation:\n  coordinates:\n    lat: 91\n    lng: \"east\"\n---\n",
            "bad.md",
        );
        record.tags = vec!["ok".to_string(), "  ".to_string()];

        let result = validate_record(&record);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_validate_clean_record() {
        let record = extract("---\ntitle: Fine\ndate: 2024-01-01\n---\n", "fine.md");
        let result = validate_record(&record);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }
}
