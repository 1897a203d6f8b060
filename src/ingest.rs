use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::DashboardError;
use crate::models::{Category, RawRegistration};

/// One row of the registrations API payload.
#[derive(Debug, Deserialize)]
struct ApiRow {
    #[serde(default)]
    enrolldate: Value,
    #[serde(default)]
    date_last_login: Value,
    #[serde(default)]
    degreetype: Value,
    #[serde(default)]
    primary_field: Value,
    #[serde(default)]
    country: Value,
    #[serde(default)]
    tier: Value,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    enrolldate: Option<String>,
    date_last_login: Option<String>,
    degreetype: Option<String>,
    primary_field: Option<String>,
    country: Option<String>,
    tier: Option<String>,
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.date_naive());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, format) {
            return Some(stamp.date());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn date_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(text) => {
            let parsed = parse_date(text);
            if parsed.is_none() && !text.trim().is_empty() {
                warn!(value = %text, "unparseable date treated as missing");
            }
            parsed
        }
        _ => None,
    }
}

/// Tiers arrive as `1`, `1.0` or `"1"`; all become `"1"`.
pub fn tier_category(text: &str) -> Category {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() && number.fract() == 0.0 => {
            Category::Known(format!("{}", number as i64))
        }
        _ => Category::from_optional(Some(trimmed)),
    }
}

fn category_value(value: &Value) -> Category {
    match value {
        Value::String(text) => Category::from_optional(Some(text.as_str())),
        Value::Number(number) => tier_category(&number.to_string()),
        Value::Bool(flag) => Category::Known(flag.to_string()),
        _ => Category::Unknown,
    }
}

fn tier_value(value: &Value) -> Category {
    match value {
        Value::String(text) => tier_category(text),
        other => category_value(other),
    }
}

impl From<ApiRow> for RawRegistration {
    fn from(row: ApiRow) -> Self {
        RawRegistration {
            enrollment_date: date_value(&row.enrolldate),
            last_login_date: date_value(&row.date_last_login),
            degree_type: category_value(&row.degreetype),
            primary_field: category_value(&row.primary_field),
            country: category_value(&row.country),
            university_tier: tier_value(&row.tier),
        }
    }
}

impl From<CsvRow> for RawRegistration {
    fn from(row: CsvRow) -> Self {
        let date = |text: Option<String>| text.as_deref().and_then(parse_date);
        RawRegistration {
            enrollment_date: date(row.enrolldate),
            last_login_date: date(row.date_last_login),
            degree_type: Category::from_optional(row.degreetype.as_deref()),
            primary_field: Category::from_optional(row.primary_field.as_deref()),
            country: Category::from_optional(row.country.as_deref()),
            university_tier: row
                .tier
                .as_deref()
                .map(tier_category)
                .unwrap_or(Category::Unknown),
        }
    }
}

pub fn from_json_str(payload: &str) -> anyhow::Result<Vec<RawRegistration>> {
    let rows: Vec<ApiRow> =
        serde_json::from_str(payload).context("registrations payload is not a JSON array")?;
    Ok(rows.into_iter().map(RawRegistration::from).collect())
}

pub fn from_csv_reader<R: std::io::Read>(reader: R) -> anyhow::Result<Vec<RawRegistration>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result.context("malformed CSV row")?;
        records.push(RawRegistration::from(row));
    }

    Ok(records)
}

/// Reads a `.json` or `.csv` export of the registrations API.
pub fn load_path(path: &Path) -> anyhow::Result<Vec<RawRegistration>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let records = match extension.as_deref() {
        Some("json") => {
            let payload = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            from_json_str(&payload)?
        }
        Some("csv") => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            from_csv_reader(file)?
        }
        _ => {
            return Err(DashboardError::Load(format!(
                "{} is neither .json nor .csv",
                path.display()
            ))
            .into())
        }
    };

    info!(path = %path.display(), records = records.len(), "read registrations");
    Ok(records)
}
