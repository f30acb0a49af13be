use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// Facility name used when the export leaves the name column out.
pub const UNKNOWN_FACILITY: &str = "Unknown";

/// One normalized capacity report: a single facility on a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub report_date: NaiveDate,
    pub facility_name: String,
    pub icu_occupied: u32,
    pub icu_vacant: u32,
    pub vent_occupied: u32,
    pub vent_vacant: u32,
    pub isolation_occupied: u32,
    pub isolation_vacant: u32,
    pub ward_occupied: u32,
    pub ward_vacant: u32,
}

impl Report {
    pub fn icu_total(&self) -> u64 {
        u64::from(self.icu_occupied) + u64::from(self.icu_vacant)
    }
}

/// The eight metrics summed over a set of reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KpiTotals {
    pub icu_occupied: u64,
    pub icu_vacant: u64,
    pub vent_occupied: u64,
    pub vent_vacant: u64,
    pub isolation_occupied: u64,
    pub isolation_vacant: u64,
    pub ward_occupied: u64,
    pub ward_vacant: u64,
}

/// ICU occupancy summed across every facility in scope for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub icu_occupied: u64,
    pub icu_vacant: u64,
}

/// Severity label derived from a utilization percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Safe,
    Warning,
    Critical,
    NoCapacity,
}

impl Tier {
    pub const CRITICAL_AT: f64 = 85.0;
    pub const WARNING_AT: f64 = 70.0;

    /// Classify a utilization percentage. A resource with no beds at all is
    /// `NoCapacity` whatever the percentage says.
    pub fn classify(utilization: f64, total: u64) -> Self {
        if total == 0 {
            Tier::NoCapacity
        } else if utilization >= Self::CRITICAL_AT {
            Tier::Critical
        } else if utilization >= Self::WARNING_AT {
            Tier::Warning
        } else {
            Tier::Safe
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Safe => "SAFE",
            Tier::Warning => "WARNING",
            Tier::Critical => "CRITICAL",
            Tier::NoCapacity => "NO CAPACITY",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status of the vacant ICU bed count across the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    NoBedsLeft,
    RunningLow,
    Adequate,
}

impl Availability {
    pub const LOW_WATERMARK: u64 = 5;

    pub fn assess(vacant: u64, total: u64) -> Self {
        if total == 0 {
            Availability::Adequate
        } else if vacant == 0 {
            Availability::NoBedsLeft
        } else if vacant < Self::LOW_WATERMARK {
            Availability::RunningLow
        } else {
            Availability::Adequate
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Availability::NoBedsLeft => "NO BEDS LEFT",
            Availability::RunningLow => "RUNNING LOW",
            Availability::Adequate => "",
        }
    }
}

/// Headline ICU card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IcuSummary {
    pub total_beds: u64,
    pub occupied: u64,
    pub available: u64,
    /// Percent, one decimal place.
    pub utilization_rate: f64,
    pub tier: Tier,
    pub availability: Availability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Ventilator,
    Isolation,
    Ward,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Ventilator => "Ventilators",
            ResourceKind::Isolation => "Isolation Beds",
            ResourceKind::Ward => "Ward Beds",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceCard {
    pub kind: ResourceKind,
    pub occupied: u64,
    pub total: u64,
    /// Whole percent.
    pub utilization: u32,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistEntry {
    pub facility_name: String,
    pub occupied: u64,
    pub total: u64,
    pub utilization_pct: f64,
    pub tier: Tier,
}

/// One position on the combined actual + forecast chart.
///
/// The last actual point also carries a forecast value so both lines join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub actual: Option<u64>,
    pub forecast: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub report_date: NaiveDate,
    pub facility_name: String,
    pub icu_occupied: u32,
    pub vent_occupied: u32,
    pub ward_occupied: u32,
    pub utilization: u32,
    pub tier: Tier,
}

// Console/export renderings. Numbers are preformatted the way the dashboard shows them.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TableRowDisplay {
    #[serde(rename = "ReportDate")]
    #[tabled(rename = "Date")]
    pub report_date: String,
    #[serde(rename = "Facility")]
    #[tabled(rename = "Facility")]
    pub facility: String,
    #[serde(rename = "IcuOccupied")]
    #[tabled(rename = "ICU Occ")]
    pub icu_occupied: u32,
    #[serde(rename = "VentOccupied")]
    #[tabled(rename = "Vent Occ")]
    pub vent_occupied: u32,
    #[serde(rename = "WardOccupied")]
    #[tabled(rename = "Ward Occ")]
    pub ward_occupied: u32,
    #[serde(rename = "Utilization")]
    #[tabled(rename = "Utilization")]
    pub utilization: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct WatchlistDisplay {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Facility")]
    #[tabled(rename = "Facility")]
    pub facility: String,
    #[serde(rename = "Occupancy")]
    #[tabled(rename = "Occupancy")]
    pub occupancy: String,
    #[serde(rename = "Utilization")]
    #[tabled(rename = "Utilization")]
    pub utilization: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CardDisplay {
    #[tabled(rename = "Resource")]
    pub resource: String,
    #[tabled(rename = "In Use")]
    pub in_use: String,
    #[tabled(rename = "Total")]
    pub total: String,
    #[tabled(rename = "Utilization")]
    pub utilization: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SeriesDisplay {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Actual")]
    pub actual: String,
    #[tabled(rename = "Forecast")]
    pub forecast: String,
}
