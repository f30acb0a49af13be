//! Short-horizon ICU occupancy projection.
//!
//! Fits an ordinary least squares line to `(position, occupied)` pairs, where
//! position is the 0-based index in the date-sorted series, and extends it
//! over the next [`HORIZON`] positions. Gaps between dates are not modelled:
//! each series point counts as one step.

use crate::types::{ChartPoint, SeriesPoint};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::debug;

/// Number of projected points.
pub const HORIZON: usize = 7;

/// Fewer points than this and no trend is fitted.
pub const MIN_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Fit `y = slope * x + intercept` by least squares.
    ///
    /// `None` when the x values have no spread, which would divide by zero.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len().min(ys.len());
        if n == 0 {
            return None;
        }
        let nf = n as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
        for (&x, &y) in xs.iter().zip(ys) {
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_xx += x * x;
        }

        let denom = nf * sum_xx - sum_x * sum_x;
        if denom == 0.0 || !denom.is_finite() {
            return None;
        }
        let slope = (nf * sum_xy - sum_x * sum_y) / denom;
        let intercept = (sum_y - slope * sum_x) / nf;
        if !slope.is_finite() || !intercept.is_finite() {
            return None;
        }
        Some(Self { slope, intercept })
    }

    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Project the next [`HORIZON`] ICU occupancy values.
///
/// Returns `None` for series of two points or fewer, and for degenerate fits.
/// Values are whole beds, never below zero.
pub fn forecast(series: &[ChartPoint]) -> Option<Vec<u64>> {
    if series.len() < MIN_POINTS {
        debug!(points = series.len(), "not enough points to forecast");
        return None;
    }
    let xs: Vec<f64> = (0..series.len()).map(|i| i as f64).collect();
    let ys: Vec<f64> = series.iter().map(|p| p.icu_occupied as f64).collect();
    let trend = LinearTrend::fit(&xs, &ys)?;

    let n = series.len();
    let projected = (n..n + HORIZON)
        .map(|i| trend.at(i as f64).round().max(0.0) as u64)
        .collect();
    Some(projected)
}

/// Calendar labels for the projected points: one day after another, starting
/// the day after the last actual date.
pub fn future_dates(last: NaiveDate) -> Vec<NaiveDate> {
    (1..=HORIZON as u64)
        .filter_map(|i| last.checked_add_days(Days::new(i)))
        .collect()
}

/// Actual points followed by projected ones.
///
/// The last actual point repeats its value as a forecast so the two lines meet.
pub fn combined_series(series: &[ChartPoint], projection: Option<&[u64]>) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = series
        .iter()
        .map(|p| SeriesPoint {
            date: p.date,
            actual: Some(p.icu_occupied),
            forecast: None,
        })
        .collect();

    let (Some(projection), Some(last)) = (projection, series.last()) else {
        return points;
    };
    if let Some(bridge) = points.last_mut() {
        bridge.forecast = Some(last.icu_occupied);
    }
    points.extend(
        future_dates(last.date)
            .into_iter()
            .zip(projection)
            .map(|(date, &value)| SeriesPoint {
                date,
                actual: None,
                forecast: Some(value),
            }),
    );
    points
}
