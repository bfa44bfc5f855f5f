use crate::query::sort::collate;
use crate::record::BlogRecord;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub name: String,
    pub count: usize,
}

/// Occurrences of each value, most frequent first.
pub fn count_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<ValueCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut items: Vec<ValueCount> = counts
        .into_iter()
        .map(|(name, count)| ValueCount {
            name: name.to_string(),
            count,
        })
        .collect();
    items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| collate(&a.name, &b.name)));
    items
}

/// Unique values in alphabetical order.
pub fn distinct_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut items: Vec<String> = count_values(values).into_iter().map(|v| v.name).collect();
    items.sort_by(|a, b| collate(a, b));
    items
}

pub fn tag_values(records: &[BlogRecord]) -> impl Iterator<Item = &str> {
    records.iter().flat_map(|r| r.tags.iter().map(String::as_str))
}

pub fn category_values(records: &[BlogRecord]) -> impl Iterator<Item = &str> {
    records.iter().filter_map(|r| r.category.as_deref())
}

pub fn format_values(counts: &[ValueCount], show_count: bool) -> Vec<String> {
    counts
        .iter()
        .map(|v| {
            if show_count {
                format!("{}: {}", v.name, v.count)
            } else {
                v.name.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_values() {
        let counts = count_values(["food", "travel", "food", "art", "travel", "food"]);
        assert_eq!(
            counts,
            vec![
                ValueCount {
                    name: "food".to_string(),
                    count: 3,
                },
                ValueCount {
                    name: "travel".to_string(),
                    count: 2,
                },
                ValueCount {
                    name: "art".to_string(),
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_ties_are_alphabetical() {
        let counts = count_values(["b", "a", "c"]);
        let names: Vec<_> = counts.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_distinct_values() {
        assert_eq!(distinct_values(["Zeta", "alpha", "Zeta"]), vec!["alpha", "Zeta"]);
    }

    #[test]
    fn test_format_values() {
        let counts = count_values(["x", "x", "y"]);
        assert_eq!(format_values(&counts, true), vec!["x: 2", "y: 1"]);
        assert_eq!(format_values(&counts, false), vec!["x", "y"]);
    }
}
