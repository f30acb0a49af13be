use crate::types::Report;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info};

/// Earliest and latest report dates in the loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The dataset was replaced; carries the new generation.
    Replaced { generation: u64, records: usize },
    /// Nothing to ingest. Whatever was loaded before stays loaded.
    Empty,
}

/// The active dataset for one session, sorted ascending by report date.
///
/// Ingestion swaps the whole dataset at once. Derived views record the
/// generation they were built from so stale results can be dropped.
#[derive(Debug, Default)]
pub struct TimeSeriesStore {
    reports: Vec<Report>,
    facilities: Vec<String>,
    bounds: Option<DateBounds>,
    generation: u64,
}

impl TimeSeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, mut reports: Vec<Report>) -> IngestOutcome {
        if reports.is_empty() {
            debug!(generation = self.generation, "empty ingestion ignored");
            return IngestOutcome::Empty;
        }

        // Stable, so same-day rows keep their source order for the snapshot tie-break.
        reports.sort_by_key(|r| r.report_date);

        let mut seen = HashSet::new();
        let mut facilities = Vec::new();
        for r in &reports {
            if seen.insert(r.facility_name.as_str()) {
                facilities.push(r.facility_name.clone());
            }
        }

        let bounds = match (reports.first(), reports.last()) {
            (Some(first), Some(last)) => Some(DateBounds {
                min: first.report_date,
                max: last.report_date,
            }),
            _ => None,
        };

        // Every derived field is computed before anything is swapped in.
        self.reports = reports;
        self.facilities = facilities;
        self.bounds = bounds;
        self.generation += 1;

        info!(
            generation = self.generation,
            records = self.reports.len(),
            facilities = self.facilities.len(),
            "dataset replaced"
        );
        IngestOutcome::Replaced {
            generation: self.generation,
            records: self.reports.len(),
        }
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Distinct facility names in order of first appearance.
    pub fn facilities(&self) -> &[String] {
        &self.facilities
    }

    pub fn bounds(&self) -> Option<DateBounds> {
        self.bounds
    }

    /// Zero until the first successful ingestion.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loaded(&self) -> bool {
        self.generation > 0
    }

    /// Whether results built at `generation` still reflect this dataset.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}
