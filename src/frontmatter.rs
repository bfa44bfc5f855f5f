//! YAML frontmatter parsing and serialization.
//!
//! A post opens with a metadata block delimited by `---`:
//!
//! ```markdown
//! ---
//! title: Lisbon in three days
//! date: 2024-06-01
//! tags: [portugal, food]
//! ---
//! # Day one
//! ```
//!
//! [`parse`] never fails. A missing, unterminated or undecodable block all
//! come back as the default fields with the original text as content; the
//! undecodable case additionally carries a [`FrontmatterError`] in
//! [`ParsedDocument::diagnostic`].

use crate::error::FrontmatterError;
use regex::Regex;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const DELIMITER: &str = "---";

/// Decoded metadata, keyed by field name.
pub type Fields = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub fields: Fields,
    pub content: String,
    pub has_frontmatter: bool,
    /// Set when a delimited block was found but could not be decoded.
    pub diagnostic: Option<FrontmatterError>,
}

impl ParsedDocument {
    fn fallback(raw: &str, diagnostic: Option<FrontmatterError>) -> Self {
        Self {
            fields: default_fields(),
            content: raw.to_string(),
            has_frontmatter: false,
            diagnostic,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key)?.as_str()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.fields.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn tags(&self) -> Vec<String> {
        string_list(self.fields.get("tags"))
    }
}

/// `draft=false, featured=false, tags=[]`
pub fn default_fields() -> Fields {
    let mut fields = Fields::new();
    fields.insert("draft".to_string(), Value::Bool(false));
    fields.insert("featured".to_string(), Value::Bool(false));
    fields.insert("tags".to_string(), Value::Sequence(Vec::new()));
    fields
}

pub fn parse(raw: &str) -> ParsedDocument {
    let trimmed = raw.trim();
    if !trimmed.starts_with(DELIMITER) {
        return ParsedDocument::fallback(raw, None);
    }

    let after_open = &trimmed[DELIMITER.len()..];
    let Some(end_idx) = after_open.find("\n---") else {
        return ParsedDocument::fallback(raw, None);
    };
    let yaml_str = &after_open[..end_idx];
    let content = after_open[end_idx + 1 + DELIMITER.len()..].trim();

    match decode(yaml_str) {
        Ok(decoded) => {
            let mut fields = default_fields();
            fields.extend(decoded);
            normalize(&mut fields);
            ParsedDocument {
                fields,
                content: content.to_string(),
                has_frontmatter: true,
                diagnostic: None,
            }
        }
        Err(err) => {
            tracing::warn!("ignoring frontmatter: {err}");
            ParsedDocument::fallback(raw, Some(err))
        }
    }
}

fn decode(yaml_str: &str) -> Result<Fields, FrontmatterError> {
    let value: Value = serde_yaml::from_str(yaml_str)
        .map_err(|e| FrontmatterError::Malformed(e.to_string()))?;

    match value {
        Value::Null => Ok(Fields::new()),
        Value::Mapping(mapping) => Ok(mapping
            .into_iter()
            .filter_map(|(key, value)| Some((scalar_to_string(&key)?, value)))
            .collect()),
        Value::Sequence(_) => Err(FrontmatterError::NotAMapping("sequence")),
        Value::Tagged(_) => Err(FrontmatterError::NotAMapping("tagged value")),
        _ => Err(FrontmatterError::NotAMapping("scalar")),
    }
}

fn normalize(fields: &mut Fields) {
    let tags = normalize_tags(fields.get("tags"));
    fields.insert("tags".to_string(), tags);

    if let Some(date) = fields.get_mut("date") {
        if !date.is_null() && !date.is_string() {
            if let Some(s) = scalar_to_string(date) {
                *date = Value::String(s);
            }
        }
    }

    for key in ["draft", "featured"] {
        if let Some(flag) = fields.get_mut(key) {
            *flag = Value::Bool(truthy(flag));
        }
    }
}

fn normalize_tags(value: Option<&Value>) -> Value {
    let tags: Vec<Value> = match value {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|s| Value::String(s.trim().to_string()))
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
        _ => Vec::new(),
    };
    Value::Sequence(tags)
}

/// Loose boolean reading of a metadata value.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty()
                && !["false", "no", "off", "0"]
                    .iter()
                    .any(|falsy| s.eq_ignore_ascii_case(falsy))
        }
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => truthy(&tagged.value),
    }
}

pub fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_sequence)
        .map(|seq| seq.iter().filter_map(scalar_to_string).collect())
        .unwrap_or_default()
}

/// Serialize `fields` into a delimited metadata block.
///
/// Serialization failure yields an empty block rather than an error.
pub fn create(fields: &Fields) -> String {
    match serde_yaml::to_string(fields) {
        Ok(yaml) => format!("{DELIMITER}\n{yaml}{DELIMITER}\n"),
        Err(err) => {
            tracing::warn!("could not serialize frontmatter: {err}");
            format!("{DELIMITER}\n{DELIMITER}\n")
        }
    }
}

/// True when every key in `required` is present, non-null and not an empty string.
pub fn validate(fields: &Fields, required: &[&str]) -> bool {
    required.iter().all(|key| match fields.get(*key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    })
}

/// Shallow merge over the default fields; later sets win.
pub fn merge(field_sets: &[&Fields]) -> Fields {
    let mut merged = default_fields();
    for fields in field_sets {
        merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").expect("invalid title regex"));

static DATE_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"(?m)^[ \t]*\*Date:[ \t]*(.+?)\*[ \t\r]*$",
        r"(?m)^[ \t]*\*\*Date:\*\*[ \t]*(.+?)[ \t\r]*$",
        r"(?m)^[ \t]*Date:[ \t]*(.+?)[ \t\r]*$",
    ]
    .map(|re| Regex::new(re).expect("invalid date regex"))
});

/// First level-one heading in the content.
pub fn extract_title_from_content(content: &str) -> Option<String> {
    let caps = TITLE_RE.captures(content)?;
    let title = caps.get(1)?.as_str().trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// First date annotation, trying `*Date: …*`, then `**Date:** …`, then `Date: …`.
pub fn extract_date_from_content(content: &str) -> Option<String> {
    DATE_RES.iter().find_map(|re| {
        let date = re.captures(content)?.get(1)?.as_str().trim();
        (!date.is_empty()).then(|| date.to_string())
    })
}
