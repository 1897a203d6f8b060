use std::collections::BTreeSet;

use crate::models::{
    academic_year_label, AxisTick, ChartDataset, ChartLine, DateField, YearSeries,
};

pub const X_DOMAIN_END: i64 = 364;

pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const MONTH_TICKS: [(i64, &str); 12] = [
    (0, "Jun"),
    (30, "Jul"),
    (61, "Aug"),
    (92, "Sep"),
    (122, "Oct"),
    (153, "Nov"),
    (183, "Dec"),
    (214, "Jan"),
    (245, "Feb"),
    (273, "Mar"),
    (304, "Apr"),
    (334, "May"),
];

pub fn month_ticks() -> Vec<AxisTick> {
    MONTH_TICKS
        .iter()
        .map(|&(position, label)| AxisTick { position, label })
        .collect()
}

pub fn chart_title(field: DateField, selected_years: &BTreeSet<i32>, has_data: bool) -> String {
    if !has_data {
        return "No data available for selected filters".to_string();
    }

    let scope = match selected_years.len() {
        0 => "All Years".to_string(),
        1 => selected_years
            .iter()
            .next()
            .map(|year| academic_year_label(*year))
            .unwrap_or_default(),
        _ => "Selected Years".to_string(),
    };

    format!("Cumulative Count by {} - {}", field.describe(), scope)
}

pub fn chart_subtitle(field: DateField) -> String {
    format!(
        "Growth curve based on {}",
        field.describe().to_ascii_lowercase()
    )
}

/// A selected year keeps its place in the selection even when earlier years have no data.
fn color_slot(academic_year: i32, index: usize, selected_years: &BTreeSet<i32>) -> usize {
    selected_years
        .iter()
        .position(|year| *year == academic_year)
        .unwrap_or(index)
}

/// Lays out one line per academic year, ascending, over a shared day-offset axis.
pub fn assemble(
    mut series: Vec<YearSeries>,
    field: DateField,
    selected_years: &BTreeSet<i32>,
) -> ChartDataset {
    series.sort_by_key(|s| s.academic_year);

    let furthest = series
        .iter()
        .filter_map(|s| s.points.last().map(|p| p.day_offset))
        .max()
        .unwrap_or(0);

    let lines: Vec<ChartLine> = series
        .into_iter()
        .enumerate()
        .map(|(index, year)| ChartLine {
            academic_year: year.academic_year,
            label: academic_year_label(year.academic_year),
            color: PALETTE[color_slot(year.academic_year, index, selected_years) % PALETTE.len()],
            points: year
                .points
                .iter()
                .map(|p| (p.day_offset, p.cumulative_count))
                .collect(),
        })
        .collect();

    ChartDataset {
        title: chart_title(field, selected_years, !lines.is_empty()),
        subtitle: chart_subtitle(field),
        x_domain: (0, furthest.max(X_DOMAIN_END)),
        x_ticks: month_ticks(),
        lines,
    }
}
