use std::collections::BTreeSet;
use std::fmt::Write;

use crate::models::{academic_year_label, Category, DashboardView, FilterSpec};

fn describe_selection(label: &str, values: &BTreeSet<Category>) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let joined = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("{label}: {joined}"))
}

pub fn build_report(spec: &FilterSpec, view: &DashboardView) -> String {
    let mut output = String::new();
    let chart = &view.chart;
    let stats = &view.stats;

    let _ = writeln!(output, "# Applicant Registration Report");
    let _ = writeln!(output, "{}", chart.title);
    let _ = writeln!(output);
    let _ = writeln!(output, "_{}_", chart.subtitle);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Filters");

    let selections: Vec<String> = [
        describe_selection("Degree type", &spec.degree_type),
        describe_selection("Primary field", &spec.primary_field),
        describe_selection("Country", &spec.country),
        describe_selection("University tier", &spec.university_tier),
    ]
    .into_iter()
    .flatten()
    .collect();

    if spec.is_empty() {
        let _ = writeln!(output, "No filters applied.");
    } else {
        for selection in selections {
            let _ = writeln!(output, "- {selection}");
        }
        if !spec.academic_years.is_empty() {
            let years = spec
                .academic_years
                .iter()
                .map(|year| academic_year_label(*year))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(output, "- Academic years: {years}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Stats");
    let _ = writeln!(output, "- Total: {}", stats.filtered_total);
    let _ = writeln!(output, "- % of Total: {:.1}%", stats.percent_of_total);
    for year in &stats.by_year {
        let _ = writeln!(output, "- {}: {}", year.label, year.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Growth by Academic Year");

    if chart.lines.is_empty() {
        let _ = writeln!(output, "No registrations match these filters.");
    } else {
        for line in &chart.lines {
            if let Some((day, total)) = line.points.last() {
                let _ = writeln!(
                    output,
                    "- {}: {} registrations, last on day {} across {} points",
                    line.label,
                    total,
                    day,
                    line.points.len()
                );
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetStore;
    use crate::models::{DateField, RawRegistration};
    use chrono::NaiveDate;

    fn registration(y: i32, m: u32, d: u32, degree: &str) -> RawRegistration {
        RawRegistration {
            enrollment_date: NaiveDate::from_ymd_opt(y, m, d),
            last_login_date: None,
            degree_type: Category::from(degree),
            primary_field: Category::Unknown,
            country: Category::from("US"),
            university_tier: Category::Unknown,
        }
    }

    #[test]
    fn report_lists_stats_and_series() {
        let store = DatasetStore::load(
            None,
            vec![
                registration(2021, 6, 1, "PhD"),
                registration(2021, 6, 1, "PhD"),
                registration(2022, 5, 15, "Masters"),
            ],
        );
        let spec = FilterSpec::default();
        let view = store.recompute(DateField::Enrollment, &spec).unwrap();

        let report = build_report(&spec, &view);
        assert!(report.contains("No filters applied."));
        assert!(report.contains("- Total: 3"));
        assert!(report.contains("- % of Total: 100.0%"));
        assert!(report.contains("- 2021–2022: 3 registrations, last on day 348 across 2 points"));
    }

    #[test]
    fn empty_selection_is_reported() {
        let store = DatasetStore::load(None, vec![registration(2021, 6, 1, "PhD")]);
        let mut spec = FilterSpec::default();
        spec.degree_type.insert(Category::Unknown);
        let view = store.recompute(DateField::Enrollment, &spec).unwrap();

        let report = build_report(&spec, &view);
        assert!(report.contains("- Degree type: Unknown"));
        assert!(report.contains("No registrations match these filters."));
        assert!(report.contains("- % of Total: 0.0%"));
    }
}
