//! Map pins for posts that carry coordinates.

use crate::record::BlogRecord;
use serde::Serialize;

const FEATURED_PHOTO_KEYS: [&str; 3] = ["featuredPhoto", "featured_photo", "image"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPin {
    pub id: String,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_photo: Option<String>,
}

/// `None` for drafts and records without usable coordinates.
pub fn project(record: &BlogRecord, url_prefix: &str) -> Option<MapPin> {
    if record.draft || !record.has_coordinates() {
        return None;
    }
    let coords = record.coordinates()?;
    let (Some(lat), Some(lng)) = (coords.latitude(), coords.longitude()) else {
        tracing::debug!(slug = %record.slug, "coordinates are not numeric, no pin");
        return None;
    };

    Some(MapPin {
        id: record.slug.clone(),
        title: record.title.clone(),
        lat,
        lng,
        description: record.description.clone(),
        tags: record.tags.clone(),
        category: record.category.clone(),
        url: format!("{}/{}", url_prefix.trim_end_matches('/'), record.slug),
        date: record.date.clone(),
        featured: record.featured,
        featured_photo: FEATURED_PHOTO_KEYS
            .iter()
            .find_map(|key| record.extra.get(*key)?.as_str())
            .map(str::to_string),
    })
}

pub fn project_all(records: &[BlogRecord], url_prefix: &str) -> Vec<MapPin> {
    records
        .iter()
        .filter_map(|r| project(r, url_prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{extract_record, ExtractOptions};

    fn record(raw: &str, path: &str) -> BlogRecord {
        extract_record(raw, path, &ExtractOptions::default()).unwrap()
    }

    #[test]
    fn test_project_pin() {
        let r = record(
            "---\ntitle: Reykjavik\ndate: 2024-02-10\ncategory: nordic\nfeatured: true\nfeaturedPhoto: photos/aurora.jpg\nlocation:\n  name: Reykjavik\n  coordinates:\n    lat: 64.14\n    lng: -21.94\n---\nNorthern lights.",
            "reykjavik.md",
        );
        let pin = project(&r, "/blog/").unwrap();
        assert_eq!(pin.id, "reykjavik");
        assert_eq!(pin.lat, 64.14);
        assert_eq!(pin.lng, -21.94);
        assert_eq!(pin.url, "/blog/reykjavik");
        assert_eq!(pin.description, "Northern lights.");
        assert_eq!(pin.featured_photo.as_deref(), Some("photos/aurora.jpg"));
        assert!(pin.featured);
    }

    #[test]
    fn test_records_without_coordinates_are_skipped() {
        let records = vec![
            record("---\nlocation:\n  coordinates:\n    lat: 1.0\n    lng: 2.0\n---\n", "a.md"),
            record("---\nlocation:\n  name: Nowhere\n---\n", "b.md"),
            record("---\nlocation:\n  coordinates:\n    lat: 3.0\n---\n", "c.md"),
            record(
                "---\nlocation:\n  coordinates:\n    lat: \"4.5\"\n    lng: \"5.5\"\n---\n",
                "d.md",
            ),
            record(
                "---\ndraft: true\nlocation:\n  coordinates:\n    lat: 1.0\n    lng: 2.0\n---\n",
                "e.md",
            ),
        ];
        let pins = project_all(&records, "/blog");
        let ids: Vec<_> = pins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(pins[1].lat, 4.5);
    }
}
