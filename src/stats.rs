use std::collections::BTreeSet;

use crate::aggregate::counts_by_year;
use crate::models::{academic_year_label, FilterStats, NormalizedRecord, YearCount};

/// Totals shown beside the chart. Years are listed newest first.
pub fn filter_stats(
    filtered: &[&NormalizedRecord],
    dataset_total: usize,
    selected_years: &BTreeSet<i32>,
) -> FilterStats {
    let counts = counts_by_year(filtered);

    let by_year: Vec<YearCount> = if selected_years.is_empty() {
        counts
            .iter()
            .rev()
            .map(|(&academic_year, &count)| year_count(academic_year, count))
            .collect()
    } else {
        selected_years
            .iter()
            .rev()
            .map(|&academic_year| {
                year_count(
                    academic_year,
                    counts.get(&academic_year).copied().unwrap_or(0),
                )
            })
            .collect()
    };

    FilterStats {
        filtered_total: filtered.len(),
        dataset_total,
        percent_of_total: percent(filtered.len(), dataset_total),
        by_year,
    }
}

fn year_count(academic_year: i32, count: usize) -> YearCount {
    YearCount {
        academic_year,
        label: academic_year_label(academic_year),
        count,
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::NaiveDate;

    fn record(academic_year: i32) -> NormalizedRecord {
        NormalizedRecord {
            date: NaiveDate::from_ymd_opt(academic_year, 7, 1).unwrap(),
            academic_year,
            day_offset: 30,
            degree_type: Category::Unknown,
            primary_field: Category::Unknown,
            country: Category::Unknown,
            university_tier: Category::Unknown,
        }
    }

    #[test]
    fn breakdown_lists_years_with_data_newest_first() {
        let records = [record(2021), record(2023), record(2023)];
        let refs: Vec<&NormalizedRecord> = records.iter().collect();

        let stats = filter_stats(&refs, 12, &BTreeSet::new());
        assert_eq!(stats.filtered_total, 3);
        assert!((stats.percent_of_total - 25.0).abs() < 0.001);
        assert_eq!(
            stats
                .by_year
                .iter()
                .map(|y| (y.academic_year, y.count))
                .collect::<Vec<_>>(),
            vec![(2023, 2), (2021, 1)]
        );
        assert_eq!(stats.by_year[0].label, "2023–2024");
    }

    #[test]
    fn selected_years_are_listed_even_when_empty() {
        let records = [record(2021)];
        let refs: Vec<&NormalizedRecord> = records.iter().collect();

        let stats = filter_stats(&refs, 1, &BTreeSet::from([2021, 2022]));
        assert_eq!(
            stats
                .by_year
                .iter()
                .map(|y| (y.academic_year, y.count))
                .collect::<Vec<_>>(),
            vec![(2022, 0), (2021, 1)]
        );
    }

    #[test]
    fn empty_dataset_reports_zero_percent() {
        let stats = filter_stats(&[], 0, &BTreeSet::new());
        assert_eq!(stats.percent_of_total, 0.0);
        assert!(stats.by_year.is_empty());
    }
}
