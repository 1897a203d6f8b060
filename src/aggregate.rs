use std::collections::BTreeMap;

use crate::models::{NormalizedRecord, SeriesPoint, YearSeries};

/// Cumulative registrations per academic year, one point per distinct day offset.
pub fn cumulative_by_year(records: &[&NormalizedRecord]) -> Vec<YearSeries> {
    let mut by_year: BTreeMap<i32, Vec<i64>> = BTreeMap::new();

    for record in records {
        by_year
            .entry(record.academic_year)
            .or_default()
            .push(record.day_offset);
    }

    by_year
        .into_iter()
        .map(|(academic_year, mut offsets)| {
            offsets.sort_unstable();
            YearSeries {
                academic_year,
                points: cumulative_points(&offsets),
            }
        })
        .collect()
}

fn cumulative_points(sorted_offsets: &[i64]) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = Vec::new();

    for (index, &day_offset) in sorted_offsets.iter().enumerate() {
        let cumulative_count = index + 1;
        match points.last_mut() {
            Some(last) if last.day_offset == day_offset => last.cumulative_count = cumulative_count,
            _ => points.push(SeriesPoint {
                day_offset,
                cumulative_count,
            }),
        }
    }

    points
}

/// Filtered record count per academic year, ascending by year.
pub fn counts_by_year(records: &[&NormalizedRecord]) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.academic_year).or_insert(0) += 1;
    }
    counts
}
