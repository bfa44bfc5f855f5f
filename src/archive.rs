//! Year/month grouping of published posts.

use crate::record::BlogRecord;
use chrono::{Datelike, Month};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveMonth {
    pub month: u32,
    pub name: String,
    pub count: usize,
    pub posts: Vec<BlogRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveYear {
    pub year: i32,
    pub count: usize,
    pub months: Vec<ArchiveMonth>,
}

/// Groups records by calendar year and month, newest first.
///
/// Records keep their relative order inside a month; undated records are left out.
pub fn build(records: Vec<BlogRecord>) -> Vec<ArchiveYear> {
    let mut years: BTreeMap<i32, BTreeMap<u32, Vec<BlogRecord>>> = BTreeMap::new();
    for record in records {
        let Some(date) = record.parsed_date() else {
            tracing::debug!(slug = %record.slug, "leaving undated post out of the archive");
            continue;
        };
        years
            .entry(date.year())
            .or_default()
            .entry(date.month())
            .or_default()
            .push(record);
    }

    years
        .into_iter()
        .rev()
        .map(|(year, months)| {
            let months: Vec<ArchiveMonth> = months
                .into_iter()
                .rev()
                .map(|(month, posts)| ArchiveMonth {
                    month,
                    name: month_name(month),
                    count: posts.len(),
                    posts,
                })
                .collect();
            ArchiveYear {
                year,
                count: months.iter().map(|m| m.count).sum(),
                months,
            }
        })
        .collect()
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}
