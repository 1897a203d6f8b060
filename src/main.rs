use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod aggregate;
mod assemble;
mod dataset;
mod error;
mod facets;
mod filter;
mod ingest;
mod models;
mod normalize;
mod report;
mod stats;

use crate::dataset::DatasetStore;
use crate::models::{Category, DateField, FilterSpec};

#[derive(Parser)]
#[command(name = "registration-growth")]
#[command(about = "Cumulative applicant registrations by academic year", long_about = None)]
struct Cli {
    /// JSON or CSV export of the registrations API (falls back to REGISTRATIONS_PATH)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Ignore registrations dated before this day, e.g. 2021-06-01
    #[arg(long, global = true)]
    cutoff: Option<NaiveDate>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ViewArgs {
    /// `enrollment` or `last_login`
    #[arg(long, default_value = "enrollment")]
    date_field: String,
    #[arg(long = "degree-type")]
    degree_types: Vec<String>,
    #[arg(long = "primary-field")]
    primary_fields: Vec<String>,
    #[arg(long = "country")]
    countries: Vec<String>,
    #[arg(long = "tier")]
    tiers: Vec<String>,
    /// Academic year label, e.g. 2021 for 2021–2022
    #[arg(long = "year")]
    years: Vec<i32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the render-ready chart dataset as JSON
    Chart {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print totals for the current filters
    Stats {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// List the values each filter accepts
    Options {
        #[arg(long, default_value = "enrollment")]
        date_field: String,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn selection(value: &str) -> Category {
    if value.trim().eq_ignore_ascii_case("unknown") {
        Category::Unknown
    } else {
        Category::from(value)
    }
}

impl ViewArgs {
    fn resolve(&self) -> anyhow::Result<(DateField, FilterSpec)> {
        let field: DateField = self.date_field.parse()?;
        let spec = FilterSpec {
            degree_type: self.degree_types.iter().map(|v| selection(v)).collect(),
            primary_field: self.primary_fields.iter().map(|v| selection(v)).collect(),
            country: self.countries.iter().map(|v| selection(v)).collect(),
            university_tier: self
                .tiers
                .iter()
                .map(|v| match selection(v) {
                    Category::Known(text) => ingest::tier_category(&text),
                    Category::Unknown => Category::Unknown,
                })
                .collect(),
            academic_years: self.years.iter().copied().collect(),
        };
        Ok((field, spec))
    }
}

/// Date field and filters are checked before the data source is looked up.
fn resolve(cli: &Cli) -> anyhow::Result<(DateField, FilterSpec, PathBuf)> {
    let (field, spec) = match &cli.command {
        Commands::Chart { view, .. } | Commands::Stats { view } | Commands::Report { view, .. } => {
            view.resolve()?
        }
        Commands::Options { date_field } => (date_field.parse()?, FilterSpec::default()),
    };

    let data_path = match &cli.data {
        Some(path) => path.clone(),
        None => std::env::var("REGISTRATIONS_PATH")
            .map(PathBuf::from)
            .context("pass --data or set REGISTRATIONS_PATH to a registrations export")?,
    };

    Ok((field, spec, data_path))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let (field, spec, data_path) = resolve(&cli)?;

    let records = ingest::load_path(&data_path)?;
    let store = DatasetStore::load(cli.cutoff, records);

    match cli.command {
        Commands::Chart { out, .. } => {
            let view = store.recompute(field, &spec)?;
            let json = serde_json::to_string_pretty(&view.chart)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), lines = view.chart.lines.len(), "chart written");
                }
                None => println!("{json}"),
            }
        }
        Commands::Stats { .. } => {
            let view = store.recompute(field, &spec)?;
            let stats = view.stats;
            println!("{}", view.chart.title);
            println!("Total: {}", stats.filtered_total);
            println!("% of Total: {:.1}%", stats.percent_of_total);
            for year in stats.by_year {
                println!("{}: {}", year.label, year.count);
            }
        }
        Commands::Options { .. } => {
            let snapshot = store.snapshot()?;
            let catalog = facets::catalog(
                &snapshot.view(DateField::Enrollment).records,
                &snapshot.view(field).records,
            );
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        Commands::Report { out, .. } => {
            let view = store.recompute(field, &spec)?;
            let report = report::build_report(&spec, &view);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
