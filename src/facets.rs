use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{academic_year_label, Category, NormalizedRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub label: String,
    pub value: String,
}

/// Dropdown choices. The Unknown bucket is selectable but not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetCatalog {
    pub degree_types: Vec<FacetOption>,
    pub primary_fields: Vec<FacetOption>,
    pub countries: Vec<FacetOption>,
    pub tiers: Vec<FacetOption>,
    pub academic_years: Vec<FacetOption>,
}

fn known_values<'a>(values: impl Iterator<Item = &'a Category>) -> BTreeSet<&'a str> {
    values
        .filter_map(|category| match category {
            Category::Known(text) => Some(text.as_str()),
            Category::Unknown => None,
        })
        .collect()
}

fn plain_options(values: BTreeSet<&str>) -> Vec<FacetOption> {
    values
        .into_iter()
        .map(|value| FacetOption {
            label: value.to_string(),
            value: value.to_string(),
        })
        .collect()
}

/// `population` is the enrollment view (well-formed, past the cutoff);
/// `view` supplies the academic years for the active date field.
pub fn catalog(population: &[NormalizedRecord], view: &[NormalizedRecord]) -> FacetCatalog {
    let years: BTreeSet<i32> = view.iter().map(|record| record.academic_year).collect();

    FacetCatalog {
        degree_types: plain_options(known_values(population.iter().map(|r| &r.degree_type))),
        primary_fields: plain_options(known_values(population.iter().map(|r| &r.primary_field))),
        countries: plain_options(known_values(population.iter().map(|r| &r.country))),
        tiers: known_values(population.iter().map(|r| &r.university_tier))
            .into_iter()
            .map(|tier| FacetOption {
                label: format!("Tier {tier}"),
                value: tier.to_string(),
            })
            .collect(),
        academic_years: years
            .into_iter()
            .map(|year| FacetOption {
                label: academic_year_label(year),
                value: year.to_string(),
            })
            .collect(),
    }
}
