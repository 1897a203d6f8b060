use std::collections::BTreeSet;

use crate::models::{Category, FilterSpec, NormalizedRecord};

fn accepts(allowed: &BTreeSet<Category>, value: &Category) -> bool {
    allowed.is_empty() || allowed.contains(value)
}

pub fn matches(spec: &FilterSpec, record: &NormalizedRecord) -> bool {
    (spec.academic_years.is_empty() || spec.academic_years.contains(&record.academic_year))
        && accepts(&spec.degree_type, &record.degree_type)
        && accepts(&spec.primary_field, &record.primary_field)
        && accepts(&spec.country, &record.country)
        && accepts(&spec.university_tier, &record.university_tier)
}

pub fn apply<'a>(records: &'a [NormalizedRecord], spec: &FilterSpec) -> Vec<&'a NormalizedRecord> {
    records.iter().filter(|record| matches(spec, record)).collect()
}
