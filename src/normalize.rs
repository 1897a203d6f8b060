use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::models::{DateField, NormalizedRecord, RawRegistration};

/// Month (1-based) on which an academic year begins.
pub const ACADEMIC_YEAR_START_MONTH: u32 = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalization {
    pub records: Vec<NormalizedRecord>,
    pub missing_enrollment: usize,
    pub missing_selected_date: usize,
    pub before_cutoff: usize,
}

pub fn academic_year(date: NaiveDate) -> i32 {
    if date.month() >= ACADEMIC_YEAR_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    }
}

pub fn academic_year_start(academic_year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(academic_year, ACADEMIC_YEAR_START_MONTH, 1)
}

/// Days since June 1 of the academic year containing `date`.
pub fn day_offset(date: NaiveDate) -> i64 {
    academic_year_start(academic_year(date))
        .map(|start| (date - start).num_days())
        .unwrap_or(0)
}

pub fn normalize(
    records: &[RawRegistration],
    field: DateField,
    cutoff: Option<NaiveDate>,
) -> Normalization {
    let mut output = Normalization::default();

    let before = |date: NaiveDate| cutoff.is_some_and(|cutoff| date < cutoff);

    for record in records {
        let Some(enrolled) = record.enrollment_date else {
            output.missing_enrollment += 1;
            continue;
        };

        // The cutoff bounds the population on enrollment, so every view is a
        // subset of the enrollment view.
        if before(enrolled) {
            output.before_cutoff += 1;
            continue;
        }

        let Some(date) = record.date_for(field) else {
            output.missing_selected_date += 1;
            continue;
        };

        if before(date) {
            output.before_cutoff += 1;
            continue;
        }

        output.records.push(NormalizedRecord {
            date,
            academic_year: academic_year(date),
            day_offset: day_offset(date),
            degree_type: record.degree_type.clone(),
            primary_field: record.primary_field.clone(),
            country: record.country.clone(),
            university_tier: record.university_tier.clone(),
        });
    }

    if output.missing_enrollment > 0 {
        warn!(
            skipped = output.missing_enrollment,
            "registrations without an enrollment date were excluded"
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn registration(enrolled: Option<NaiveDate>, last_login: Option<NaiveDate>) -> RawRegistration {
        RawRegistration {
            enrollment_date: enrolled,
            last_login_date: last_login,
            degree_type: Category::from("PhD"),
            primary_field: Category::Unknown,
            country: Category::from("US"),
            university_tier: Category::from("1"),
        }
    }

    #[test]
    fn academic_year_flips_on_june_first() {
        assert_eq!(academic_year(date(2022, 5, 31)), 2021);
        assert_eq!(academic_year(date(2022, 6, 1)), 2022);
        assert_eq!(academic_year(date(2022, 1, 1)), 2021);
        assert_eq!(academic_year(date(2021, 12, 31)), 2021);
    }

    #[test]
    fn offsets_span_the_academic_year() {
        assert_eq!(day_offset(date(2021, 6, 1)), 0);
        assert_eq!(day_offset(date(2022, 5, 15)), 348);
        assert_eq!(day_offset(date(2022, 5, 31)), 364);
    }

    #[test]
    fn leap_february_pushes_last_day_to_365() {
        assert_eq!(academic_year(date(2024, 2, 29)), 2023);
        assert_eq!(day_offset(date(2024, 2, 29)), 273);
        assert_eq!(academic_year(date(2024, 5, 31)), 2023);
        assert_eq!(day_offset(date(2024, 5, 31)), 365);
        assert_eq!(academic_year(date(2024, 6, 1)), 2024);
        assert_eq!(day_offset(date(2024, 6, 1)), 0);
    }

    #[test]
    fn missing_enrollment_is_counted_not_kept() {
        let records = vec![
            registration(None, Some(date(2022, 1, 1))),
            registration(Some(date(2021, 7, 1)), None),
        ];

        let result = normalize(&records, DateField::Enrollment, None);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.missing_enrollment, 1);
        assert_eq!(result.records[0].day_offset, 30);
    }

    #[test]
    fn last_login_view_drops_never_logged_in() {
        let records = vec![
            registration(Some(date(2021, 7, 1)), None),
            registration(Some(date(2021, 7, 1)), Some(date(2022, 3, 1))),
        ];

        let result = normalize(&records, DateField::LastLogin, None);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.missing_selected_date, 1);
        assert_eq!(result.records[0].date, date(2022, 3, 1));
        assert_eq!(result.records[0].academic_year, 2021);
    }

    #[test]
    fn cutoff_excludes_earlier_dates() {
        let records = vec![
            registration(Some(date(2021, 5, 31)), None),
            registration(Some(date(2021, 6, 1)), None),
        ];

        let result = normalize(&records, DateField::Enrollment, Some(date(2021, 6, 1)));
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.before_cutoff, 1);
    }

    #[test]
    fn cutoff_applies_to_enrollment_in_the_login_view() {
        let records = vec![
            registration(Some(date(2020, 9, 1)), Some(date(2022, 1, 4))),
            registration(Some(date(2021, 7, 1)), Some(date(2021, 5, 1))),
            registration(Some(date(2021, 7, 1)), Some(date(2022, 2, 1))),
        ];

        let result = normalize(&records, DateField::LastLogin, Some(date(2021, 6, 1)));
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.before_cutoff, 2);
        assert_eq!(result.records[0].date, date(2022, 2, 1));
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let records = vec![
            registration(Some(date(2021, 9, 3)), Some(date(2023, 2, 1))),
            registration(Some(date(2022, 2, 3)), None),
        ];

        assert_eq!(
            normalize(&records, DateField::Enrollment, None),
            normalize(&records, DateField::Enrollment, None)
        );
    }
}
