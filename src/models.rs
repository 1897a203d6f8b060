use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DashboardError;

/// A categorical attribute value. Missing or blank input is the `Unknown` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Category {
    Known(String),
    Unknown,
}

impl Category {
    pub fn from_optional(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(text) if !text.is_empty() => Category::Known(text.to_string()),
            _ => Category::Unknown,
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category::from_optional(Some(value))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Known(text) => f.write_str(text),
            Category::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Which calendar date positions a registration on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Enrollment,
    LastLogin,
}

impl DateField {
    pub fn describe(&self) -> &'static str {
        match self {
            DateField::Enrollment => "Enrollment Date",
            DateField::LastLogin => "Last Login Date",
        }
    }
}

impl FromStr for DateField {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "enrollment" | "enrolldate" => Ok(DateField::Enrollment),
            "last_login" | "last-login" | "date_last_login" => Ok(DateField::LastLogin),
            other => Err(DashboardError::InvalidConfiguration(format!(
                "unrecognized date field '{other}' (expected 'enrollment' or 'last_login')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRegistration {
    /// `None` marks a malformed record; the normalizer drops and counts it.
    pub enrollment_date: Option<NaiveDate>,
    pub last_login_date: Option<NaiveDate>,
    pub degree_type: Category,
    pub primary_field: Category,
    pub country: Category,
    pub university_tier: Category,
}

impl RawRegistration {
    pub fn date_for(&self, field: DateField) -> Option<NaiveDate> {
        match field {
            DateField::Enrollment => self.enrollment_date,
            DateField::LastLogin => self.last_login_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    pub academic_year: i32,
    pub day_offset: i64,
    pub degree_type: Category,
    pub primary_field: Category,
    pub country: Category,
    pub university_tier: Category,
}

/// Active constraints. An empty set leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub degree_type: BTreeSet<Category>,
    pub primary_field: BTreeSet<Category>,
    pub country: BTreeSet<Category>,
    pub university_tier: BTreeSet<Category>,
    pub academic_years: BTreeSet<i32>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.degree_type.is_empty()
            && self.primary_field.is_empty()
            && self.country.is_empty()
            && self.university_tier.is_empty()
            && self.academic_years.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub day_offset: i64,
    pub cumulative_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSeries {
    pub academic_year: i32,
    pub points: Vec<SeriesPoint>,
}

impl YearSeries {
    pub fn total(&self) -> usize {
        self.points.last().map(|p| p.cumulative_count).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartLine {
    pub academic_year: i32,
    pub label: String,
    pub color: &'static str,
    /// `(x, y)` pairs: day offset and cumulative count.
    pub points: Vec<(i64, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisTick {
    pub position: i64,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartDataset {
    pub title: String,
    pub subtitle: String,
    pub x_domain: (i64, i64),
    pub x_ticks: Vec<AxisTick>,
    pub lines: Vec<ChartLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub academic_year: i32,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterStats {
    pub filtered_total: usize,
    pub dataset_total: usize,
    pub percent_of_total: f64,
    pub by_year: Vec<YearCount>,
}

/// Everything one recompute pass hands to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub chart: ChartDataset,
    pub stats: FilterStats,
}

pub fn academic_year_label(academic_year: i32) -> String {
    format!("{}–{}", academic_year, academic_year + 1)
}
