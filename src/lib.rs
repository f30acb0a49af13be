//! Hospital bed-capacity pipeline.
//!
//! Raw capacity exports go in; the dashboard's plain data comes out:
//! KPI totals, resource cards, a ranked watchlist, an actual + forecast
//! ICU series and a capped records table. Nothing here renders.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod loader;
pub mod output;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod util;

pub use dashboard::{Dashboard, DashboardView};
pub use filter::{FacilityFilter, FilterCriteria};
pub use loader::{Acquisition, LoadReport, RecordParser};
pub use store::TimeSeriesStore;
pub use types::{Report, Tier};
