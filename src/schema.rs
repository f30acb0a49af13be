// Fixed-position column mapping for capacity exports.
//
// The export has no usable header names, only positions. The mapping lives in
// one table so positions are checked once, not scattered through the parser.
use crate::error::SchemaError;
use crate::types::Report;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The mapping every export from the reporting portal follows.
pub static REFERENCE_SCHEMA: Lazy<ColumnSchema> = Lazy::new(ColumnSchema::reference);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    IcuOccupied,
    IcuVacant,
    VentOccupied,
    VentVacant,
    IsolationOccupied,
    IsolationVacant,
    WardOccupied,
    WardVacant,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::IcuOccupied,
        Metric::IcuVacant,
        Metric::VentOccupied,
        Metric::VentVacant,
        Metric::IsolationOccupied,
        Metric::IsolationVacant,
        Metric::WardOccupied,
        Metric::WardVacant,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::IcuOccupied => "icu_occupied",
            Metric::IcuVacant => "icu_vacant",
            Metric::VentOccupied => "vent_occupied",
            Metric::VentVacant => "vent_vacant",
            Metric::IsolationOccupied => "isolation_occupied",
            Metric::IsolationVacant => "isolation_vacant",
            Metric::WardOccupied => "ward_occupied",
            Metric::WardVacant => "ward_vacant",
        }
    }

    pub(crate) fn slot(self, report: &mut Report) -> &mut u32 {
        match self {
            Metric::IcuOccupied => &mut report.icu_occupied,
            Metric::IcuVacant => &mut report.icu_vacant,
            Metric::VentOccupied => &mut report.vent_occupied,
            Metric::VentVacant => &mut report.vent_vacant,
            Metric::IsolationOccupied => &mut report.isolation_occupied,
            Metric::IsolationVacant => &mut report.isolation_vacant,
            Metric::WardOccupied => &mut report.ward_occupied,
            Metric::WardVacant => &mut report.ward_vacant,
        }
    }
}

/// Source columns for one metric. Multiple columns are summed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricColumns {
    pub metric: Metric,
    pub columns: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Rows narrower than this are rejected.
    pub min_columns: usize,
    pub date: usize,
    /// May sit past `min_columns`; a missing name becomes `Unknown`.
    pub facility: usize,
    pub metrics: Vec<MetricColumns>,
}

impl ColumnSchema {
    pub fn reference() -> Self {
        let m = |metric, columns: &[usize]| MetricColumns {
            metric,
            columns: columns.to_vec(),
        };
        Self {
            min_columns: 20,
            date: 16,
            facility: 20,
            metrics: vec![
                // Adult and pediatric ICU beds roll into one ICU figure.
                m(Metric::IcuOccupied, &[9, 18]),
                m(Metric::IcuVacant, &[4, 11]),
                m(Metric::VentOccupied, &[10]),
                m(Metric::VentVacant, &[7]),
                m(Metric::IsolationOccupied, &[12]),
                m(Metric::IsolationVacant, &[19]),
                m(Metric::WardOccupied, &[14]),
                m(Metric::WardVacant, &[8]),
            ],
        }
    }

    /// Check that every required column lies within the minimum width and
    /// that no column feeds two fields.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.min_columns == 0 {
            return Err(SchemaError::ZeroMinimum);
        }

        let mut claimed: HashMap<usize, &'static str> = HashMap::new();
        let mut claim = |field: &'static str, index: usize| match claimed.insert(index, field) {
            Some(first) => Err(SchemaError::Collision {
                index,
                first,
                second: field,
            }),
            None => Ok(()),
        };

        let in_range = |field: &'static str, index: usize| {
            if index < self.min_columns {
                Ok(())
            } else {
                Err(SchemaError::OutOfRange {
                    field,
                    index,
                    min_columns: self.min_columns,
                })
            }
        };

        in_range("report_date", self.date)?;
        claim("report_date", self.date)?;
        claim("facility_name", self.facility)?;

        for entry in &self.metrics {
            let field = entry.metric.name();
            if entry.columns.is_empty() {
                return Err(SchemaError::Empty { field });
            }
            for &index in &entry.columns {
                in_range(field, index)?;
                claim(field, index)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_schema_is_valid() {
        assert_eq!(REFERENCE_SCHEMA.validate(), Ok(()));
        assert_eq!(REFERENCE_SCHEMA.metrics.len(), Metric::ALL.len());
    }

    #[test]
    fn rejects_shared_columns() {
        let mut schema = ColumnSchema::reference();
        schema.metrics[2].columns = vec![9];
        assert_eq!(
            schema.validate(),
            Err(SchemaError::Collision {
                index: 9,
                first: "icu_occupied",
                second: "vent_occupied",
            })
        );
    }

    #[test]
    fn rejects_required_column_past_minimum() {
        let mut schema = ColumnSchema::reference();
        schema.date = 25;
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::OutOfRange { field: "report_date", .. })
        ));
    }

    #[test]
    fn rejects_empty_metric_and_zero_minimum() {
        let mut schema = ColumnSchema::reference();
        schema.metrics[0].columns.clear();
        assert_eq!(
            schema.validate(),
            Err(SchemaError::Empty { field: "icu_occupied" })
        );

        let mut schema = ColumnSchema::reference();
        schema.min_columns = 0;
        assert_eq!(schema.validate(), Err(SchemaError::ZeroMinimum));
    }
}
