// Runs the whole pipeline for one filter selection.
//
// filter -> snapshot -> totals/cards/watchlist
//        -> per-date series -> forecast
//        -> capped table
use crate::aggregate::{kpi_totals, series_by_date, table_rows, watchlist};
use crate::filter::{filter_reports_at, FilterCriteria};
use crate::forecast::{combined_series, forecast};
use crate::loader::Acquisition;
use crate::snapshot::latest_per_facility;
use crate::store::{IngestOutcome, TimeSeriesStore};
use crate::types::{
    ChartPoint, IcuSummary, KpiTotals, ResourceCard, SeriesPoint, TableRow, WatchlistEntry,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_TABLE_LIMIT: usize = 100;
pub const MIN_TABLE_LIMIT: usize = 50;

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Store generation this view was built from.
    pub generation: u64,
    pub criteria: FilterCriteria,
    /// Reports matching the criteria, before the snapshot reduction.
    pub matched: usize,
    /// Facilities in the snapshot.
    pub facilities_reporting: usize,
    pub totals: KpiTotals,
    pub icu: IcuSummary,
    pub resources: [ResourceCard; 3],
    /// Only produced when every facility is in scope.
    pub watchlist: Option<Vec<WatchlistEntry>>,
    pub series: Vec<ChartPoint>,
    pub forecast: Option<Vec<u64>>,
    pub chart: Vec<SeriesPoint>,
    pub table: Vec<TableRow>,
}

/// One session's dataset and the views derived from it.
#[derive(Debug)]
pub struct Dashboard {
    store: TimeSeriesStore,
    table_limit: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_LIMIT)
    }
}

impl Dashboard {
    /// `table_limit` is clamped into the 50..=100 row window.
    pub fn new(table_limit: usize) -> Self {
        Self {
            store: TimeSeriesStore::new(),
            table_limit: table_limit.clamp(MIN_TABLE_LIMIT, DEFAULT_TABLE_LIMIT),
        }
    }

    pub fn store(&self) -> &TimeSeriesStore {
        &self.store
    }

    pub fn table_limit(&self) -> usize {
        self.table_limit
    }

    /// Replace the dataset with whatever was acquired; unavailable or empty
    /// sources leave the current dataset in place.
    pub fn ingest(&mut self, acquisition: Acquisition) -> IngestOutcome {
        self.store.ingest(acquisition.into_reports())
    }

    /// Criteria covering the whole loaded date range for every facility.
    pub fn default_criteria(&self) -> FilterCriteria {
        FilterCriteria::from_bounds(self.store.bounds())
    }

    pub fn view(&self, criteria: &FilterCriteria) -> Option<DashboardView> {
        self.view_at(criteria, Local::now().date_naive())
    }

    /// `None` until a dataset has been loaded.
    pub fn view_at(&self, criteria: &FilterCriteria, today: NaiveDate) -> Option<DashboardView> {
        if !self.store.is_loaded() {
            return None;
        }
        Some(build_view(&self.store, criteria, today, self.table_limit))
    }

    /// Keep `view` only if no ingestion happened since it was built.
    pub fn accept(&self, view: DashboardView) -> Option<DashboardView> {
        if self.store.is_current(view.generation) {
            Some(view)
        } else {
            debug!(
                stale = view.generation,
                current = self.store.generation(),
                "discarding stale view"
            );
            None
        }
    }
}

pub fn build_view(
    store: &TimeSeriesStore,
    criteria: &FilterCriteria,
    today: NaiveDate,
    table_limit: usize,
) -> DashboardView {
    let matched = filter_reports_at(store, criteria, today);
    let snapshot = latest_per_facility(&matched);
    let totals = kpi_totals(&snapshot);

    let series = series_by_date(&matched);
    let projection = forecast(&series);
    let chart = combined_series(&series, projection.as_deref());

    let ranked = criteria.facility.is_all().then(|| watchlist(&snapshot));

    debug!(
        matched = matched.len(),
        facilities = snapshot.len(),
        points = series.len(),
        "dashboard view built"
    );

    DashboardView {
        generation: store.generation(),
        criteria: criteria.clone(),
        matched: matched.len(),
        facilities_reporting: snapshot.len(),
        icu: totals.icu_summary(),
        resources: totals.resource_cards(),
        totals,
        watchlist: ranked,
        table: table_rows(&matched, table_limit),
        series,
        forecast: projection,
        chart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Report;

    fn report(day: u32, facility: &str, icu: (u32, u32)) -> Report {
        Report {
            report_date: NaiveDate::from_ymd_opt(2021, 9, day).unwrap(),
            facility_name: facility.to_string(),
            icu_occupied: icu.0,
            icu_vacant: icu.1,
            vent_occupied: 0,
            vent_vacant: 0,
            isolation_occupied: 0,
            isolation_vacant: 0,
            ward_occupied: 0,
            ward_vacant: 0,
        }
    }

    fn loaded(reports: Vec<Report>) -> Dashboard {
        let mut dashboard = Dashboard::default();
        dashboard.ingest(Acquisition::Loaded {
            reports,
            load_report: Default::default(),
        });
        dashboard
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    #[test]
    fn no_view_before_first_load() {
        let mut dashboard = Dashboard::default();
        assert_eq!(dashboard.ingest(Acquisition::Unavailable), IngestOutcome::Empty);
        assert!(dashboard.view_at(&FilterCriteria::default(), today()).is_none());
    }

    #[test]
    fn single_facility_view_has_no_watchlist() {
        let dashboard = loaded(vec![report(1, "A", (3, 1)), report(1, "B", (1, 1))]);
        let criteria = dashboard.default_criteria().with_facility("A");
        let view = dashboard.view_at(&criteria, today()).unwrap();
        assert!(view.watchlist.is_none());
        assert_eq!(view.totals.icu_occupied, 3);
        assert_eq!(view.matched, 1);
    }

    #[test]
    fn stale_views_are_rejected_after_reingestion() {
        let mut dashboard = loaded(vec![report(1, "A", (3, 1))]);
        let view = dashboard.view_at(&dashboard.default_criteria(), today()).unwrap();
        dashboard.ingest(Acquisition::Loaded {
            reports: vec![report(2, "B", (1, 1))],
            load_report: Default::default(),
        });
        assert!(dashboard.accept(view).is_none());

        let fresh = dashboard.view_at(&dashboard.default_criteria(), today()).unwrap();
        assert!(dashboard.accept(fresh).is_some());
    }

    #[test]
    fn chart_includes_forecast_once_enough_days_exist() {
        let dashboard = loaded(vec![
            report(1, "A", (10, 0)),
            report(2, "A", (12, 0)),
            report(3, "A", (14, 0)),
        ]);
        let view = dashboard.view_at(&dashboard.default_criteria(), today()).unwrap();
        assert_eq!(view.forecast.as_deref(), Some(&[16, 18, 20, 22, 24, 26, 28][..]));
        assert_eq!(view.chart.len(), 10);
    }

    #[test]
    fn table_limit_is_clamped_and_applied() {
        assert_eq!(Dashboard::new(5).table_limit(), MIN_TABLE_LIMIT);
        assert_eq!(Dashboard::new(500).table_limit(), DEFAULT_TABLE_LIMIT);

        let reports = (0..120)
            .map(|i| report(1 + (i % 28) as u32, &format!("F{i}"), (1, 1)))
            .collect();
        let dashboard = loaded(reports);
        let view = dashboard.view_at(&dashboard.default_criteria(), today()).unwrap();
        assert_eq!(view.matched, 120);
        assert_eq!(view.table.len(), DEFAULT_TABLE_LIMIT);
    }
}
