use std::cell::OnceCell;
use std::rc::Rc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::aggregate;
use crate::assemble;
use crate::error::DashboardError;
use crate::filter;
use crate::models::{DashboardView, DateField, FilterSpec, RawRegistration, YearSeries};
use crate::normalize::{self, Normalization};
use crate::stats;

/// One loaded copy of the registration data. Read-only once built.
#[derive(Debug)]
pub struct Snapshot {
    pub generation: u64,
    raw: Vec<RawRegistration>,
    cutoff: Option<NaiveDate>,
    enrollment: OnceCell<Normalization>,
    last_login: OnceCell<Normalization>,
}

impl Snapshot {
    fn new(generation: u64, raw: Vec<RawRegistration>, cutoff: Option<NaiveDate>) -> Self {
        Self {
            generation,
            raw,
            cutoff,
            enrollment: OnceCell::new(),
            last_login: OnceCell::new(),
        }
    }

    pub fn view(&self, field: DateField) -> &Normalization {
        let cell = match field {
            DateField::Enrollment => &self.enrollment,
            DateField::LastLogin => &self.last_login,
        };
        cell.get_or_init(|| {
            let normalized = normalize::normalize(&self.raw, field, self.cutoff);
            debug!(
                generation = self.generation,
                ?field,
                kept = normalized.records.len(),
                missing_date = normalized.missing_selected_date,
                before_cutoff = normalized.before_cutoff,
                "normalized registrations"
            );
            normalized
        })
    }

    /// Registrations counted toward "% of total": well-formed and past the cutoff.
    pub fn total(&self) -> usize {
        self.view(DateField::Enrollment).records.len()
    }

    pub fn recompute(&self, field: DateField, spec: &FilterSpec) -> DashboardView {
        let view = self.view(field);
        let filtered = filter::apply(&view.records, spec);
        let series = aggregate::cumulative_by_year(&filtered);
        debug!(
            matched = filtered.len(),
            years = series.len(),
            plotted = series.iter().map(YearSeries::total).sum::<usize>(),
            ?field,
            "recomputed registration series"
        );

        DashboardView {
            chart: assemble::assemble(series, field, &spec.academic_years),
            stats: stats::filter_stats(&filtered, self.total(), &spec.academic_years),
        }
    }
}

/// Holds the current snapshot. `reload` swaps in a fresh one wholesale.
#[derive(Debug, Default)]
pub struct DatasetStore {
    cutoff: Option<NaiveDate>,
    current: Option<Rc<Snapshot>>,
    generation: u64,
}

impl DatasetStore {
    pub fn new(cutoff: Option<NaiveDate>) -> Self {
        Self {
            cutoff,
            current: None,
            generation: 0,
        }
    }

    pub fn load(cutoff: Option<NaiveDate>, records: Vec<RawRegistration>) -> Self {
        let mut store = Self::new(cutoff);
        store.reload(records);
        store
    }

    pub fn reload(&mut self, records: Vec<RawRegistration>) -> Rc<Snapshot> {
        self.generation += 1;
        info!(
            generation = self.generation,
            records = records.len(),
            "registration dataset loaded"
        );
        let snapshot = Rc::new(Snapshot::new(self.generation, records, self.cutoff));
        self.current = Some(Rc::clone(&snapshot));
        snapshot
    }

    pub fn snapshot(&self) -> Result<Rc<Snapshot>, DashboardError> {
        self.current.clone().ok_or(DashboardError::NotLoaded)
    }

    pub fn recompute(
        &self,
        field: DateField,
        spec: &FilterSpec,
    ) -> Result<DashboardView, DashboardError> {
        Ok(self.snapshot()?.recompute(field, spec))
    }
}
