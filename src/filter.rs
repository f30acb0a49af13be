use crate::store::{DateBounds, TimeSeriesStore};
use crate::types::Report;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which facilities a view covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum FacilityFilter {
    #[default]
    All,
    Named(String),
}

impl FacilityFilter {
    pub fn matches(&self, facility_name: &str) -> bool {
        match self {
            FacilityFilter::All => true,
            FacilityFilter::Named(name) => name == facility_name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FacilityFilter::All)
    }
}

impl FromStr for FacilityFilter {
    type Err = std::convert::Infallible;

    /// `all` (any case) selects every facility; anything else is an exact name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(FacilityFilter::All)
        } else {
            Ok(FacilityFilter::Named(s.to_string()))
        }
    }
}

impl fmt::Display for FacilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacilityFilter::All => f.write_str("all"),
            FacilityFilter::Named(name) => f.write_str(name),
        }
    }
}

/// Date range and facility selection. Both date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    /// `None` means no lower limit.
    pub date_from: Option<NaiveDate>,
    /// `None` means through today.
    pub date_to: Option<NaiveDate>,
    pub facility: FacilityFilter,
}

impl FilterCriteria {
    /// Criteria spanning the whole dataset for every facility.
    pub fn from_bounds(bounds: Option<DateBounds>) -> Self {
        Self {
            date_from: bounds.map(|b| b.min),
            date_to: bounds.map(|b| b.max),
            facility: FacilityFilter::All,
        }
    }

    /// Narrow to one facility, keeping the date range.
    pub fn with_facility(&self, name: impl Into<String>) -> Self {
        Self {
            facility: FacilityFilter::Named(name.into()),
            ..self.clone()
        }
    }

    /// Resolve the bounds into a concrete inclusive range.
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (
            self.date_from.unwrap_or(NaiveDate::MIN),
            self.date_to.unwrap_or(today),
        )
    }

    pub fn matches(&self, report: &Report, today: NaiveDate) -> bool {
        let (from, to) = self.date_range(today);
        // Dates carry no time of day, so `<= to` already covers the whole end day.
        from <= report.report_date
            && report.report_date <= to
            && self.facility.matches(&report.facility_name)
    }
}

/// Reports matching `criteria`, in store order. An open upper bound means today.
pub fn filter_reports<'a>(
    store: &'a TimeSeriesStore,
    criteria: &FilterCriteria,
) -> Vec<&'a Report> {
    filter_reports_at(store, criteria, Local::now().date_naive())
}

/// Same as [`filter_reports`] with an explicit "today".
pub fn filter_reports_at<'a>(
    store: &'a TimeSeriesStore,
    criteria: &FilterCriteria,
    today: NaiveDate,
) -> Vec<&'a Report> {
    store
        .reports()
        .iter()
        .filter(|r| criteria.matches(r, today))
        .collect()
}
