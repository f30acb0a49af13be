// Record parsing and source acquisition.
//
// Parsing never fails as a whole: rows that can't produce a report are counted
// and dropped. Acquisition failures are logged and turned into "no data".
use crate::error::{LoadError, SchemaError};
use crate::schema::{ColumnSchema, REFERENCE_SCHEMA};
use crate::types::{Report, UNKNOWN_FACILITY};
use crate::util::{clean_text, parse_count, parse_date_safe};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Data rows seen, header excluded.
    pub total_rows: usize,
    pub accepted_rows: usize,
    /// Too narrow, undecodable, or without a usable date.
    pub rejected_rows: usize,
}

/// Outcome of trying to obtain a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Acquisition {
    Loaded {
        reports: Vec<Report>,
        load_report: LoadReport,
    },
    /// Nothing to ingest: missing file, read error, or no upload.
    Unavailable,
}

impl Acquisition {
    pub fn reports(&self) -> &[Report] {
        match self {
            Acquisition::Loaded { reports, .. } => reports,
            Acquisition::Unavailable => &[],
        }
    }

    pub fn into_reports(self) -> Vec<Report> {
        match self {
            Acquisition::Loaded { reports, .. } => reports,
            Acquisition::Unavailable => Vec::new(),
        }
    }
}

/// Turns delimited text into reports using a validated column mapping.
#[derive(Debug, Clone)]
pub struct RecordParser {
    schema: ColumnSchema,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self {
            schema: REFERENCE_SCHEMA.clone(),
        }
    }
}

impl RecordParser {
    pub fn new(schema: ColumnSchema) -> Result<Self, SchemaError> {
        schema.validate()?;
        Ok(Self { schema })
    }

    /// Parse every data line after the header line.
    ///
    /// Each line is decoded on its own, so an unbalanced quote costs at most
    /// that line. Blank lines are skipped and not counted. Output order
    /// follows the source; the store sorts on ingestion.
    pub fn parse_str(&self, text: &str) -> (Vec<Report>, LoadReport) {
        let mut load_report = LoadReport::default();
        let mut reports = Vec::new();

        for (idx, line) in text.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            load_report.total_rows += 1;
            let record = match decode_line(line) {
                Ok(Some(r)) => r,
                Ok(None) => {
                    load_report.rejected_rows += 1;
                    continue;
                }
                Err(e) => {
                    debug!(line = idx + 1, error = %e, "skipping undecodable row");
                    load_report.rejected_rows += 1;
                    continue;
                }
            };
            match self.parse_record(&record) {
                Some(report) => reports.push(report),
                None => load_report.rejected_rows += 1,
            }
        }

        load_report.accepted_rows = reports.len();
        debug!(
            total = load_report.total_rows,
            accepted = load_report.accepted_rows,
            rejected = load_report.rejected_rows,
            "parsed capacity rows"
        );
        (reports, load_report)
    }

    /// Map one row to a report, or `None` when it is too narrow or undated.
    pub fn parse_record(&self, record: &StringRecord) -> Option<Report> {
        if record.len() < self.schema.min_columns {
            return None;
        }

        let report_date = parse_date_safe(record.get(self.schema.date))?;
        let facility_name = match record.get(self.schema.facility).map(clean_text) {
            Some(name) if !name.is_empty() => name,
            _ => UNKNOWN_FACILITY.to_string(),
        };

        let mut report = Report {
            report_date,
            facility_name,
            icu_occupied: 0,
            icu_vacant: 0,
            vent_occupied: 0,
            vent_vacant: 0,
            isolation_occupied: 0,
            isolation_vacant: 0,
            ward_occupied: 0,
            ward_vacant: 0,
        };
        for entry in &self.schema.metrics {
            let value = entry
                .columns
                .iter()
                .map(|&index| parse_count(record.get(index)))
                .fold(0u32, u32::saturating_add);
            *entry.metric.slot(&mut report) = value;
        }
        Some(report)
    }
}

/// Split one line into fields, honoring quotes within the line only.
fn decode_line(line: &str) -> Result<Option<StringRecord>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    rdr.records().next().transpose()
}

/// Parse text with the reference column mapping.
pub fn parse_text(text: &str) -> (Vec<Report>, LoadReport) {
    RecordParser::default().parse_str(text)
}

/// Read and parse a file, surfacing I/O failures.
pub fn try_load_file(
    parser: &RecordParser,
    path: impl AsRef<Path>,
) -> Result<(Vec<Report>, LoadReport), LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_bytes(parser, &bytes))
}

/// Load the dataset at `path`, treating any failure as "no data yet".
pub fn acquire_file(parser: &RecordParser, path: impl AsRef<Path>) -> Acquisition {
    let path = path.as_ref();
    match try_load_file(parser, path) {
        Ok((reports, load_report)) => {
            info!(
                path = %path.display(),
                rows = load_report.total_rows,
                accepted = load_report.accepted_rows,
                "capacity data loaded"
            );
            Acquisition::Loaded {
                reports,
                load_report,
            }
        }
        Err(e) => {
            warn!(error = %e, "auto-load skipped");
            Acquisition::Unavailable
        }
    }
}

/// Parse an uploaded file's contents; `None` means nothing was selected.
pub fn acquire_upload(parser: &RecordParser, upload: Option<&[u8]>) -> Acquisition {
    let Some(bytes) = upload else {
        info!("no file selected");
        return Acquisition::Unavailable;
    };
    let (reports, load_report) = parse_bytes(parser, bytes);
    Acquisition::Loaded {
        reports,
        load_report,
    }
}

fn parse_bytes(parser: &RecordParser, bytes: &[u8]) -> (Vec<Report>, LoadReport) {
    // Exports occasionally carry stray Latin-1 bytes; keep the row rather than reject it.
    let text = String::from_utf8_lossy(bytes);
    parser.parse_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str =
        "c0,c1,c2,c3,c4,c5,c6,c7,c8,c9,c10,c11,c12,c13,c14,c15,c16,c17,c18,c19,c20";

    /// Build a row in the reference layout.
    fn row(date: &str, facility: &str, icu: (u32, u32, u32, u32)) -> String {
        let mut cols = vec![String::new(); 21];
        cols[16] = date.to_string();
        cols[20] = facility.to_string();
        cols[9] = icu.0.to_string();
        cols[18] = icu.1.to_string();
        cols[4] = icu.2.to_string();
        cols[11] = icu.3.to_string();
        cols[10] = "3".into();
        cols[7] = "1".into();
        cols[12] = "2".into();
        cols[19] = "6".into();
        cols[14] = "40".into();
        cols[8] = "12".into();
        cols.join(",")
    }

    #[test]
    fn parses_reference_layout_and_merges_icu_columns() {
        let text = format!("{HEADER}\n{}\n", row("2021-01-05", "\"General\"", (5, 3, 1, 1)));
        let (reports, load_report) = parse_text(&text);

        assert_eq!(load_report.total_rows, 1);
        assert_eq!(load_report.rejected_rows, 0);
        let r = &reports[0];
        assert_eq!(r.report_date, NaiveDate::from_ymd_opt(2021, 1, 5).unwrap());
        assert_eq!(r.facility_name, "General");
        assert_eq!((r.icu_occupied, r.icu_vacant), (8, 2));
        assert_eq!((r.vent_occupied, r.vent_vacant), (3, 1));
        assert_eq!((r.isolation_occupied, r.isolation_vacant), (2, 6));
        assert_eq!((r.ward_occupied, r.ward_vacant), (40, 12));
    }

    #[test]
    fn narrow_rows_and_trailing_blank_lines_are_dropped() {
        let text = format!(
            "{HEADER}\n{}\na,b,c\n\n\n",
            row("2021-01-05", "General", (1, 1, 1, 1))
        );
        let (reports, load_report) = parse_text(&text);
        assert_eq!(reports.len(), 1);
        assert_eq!(load_report.total_rows, 2);
        assert_eq!(load_report.rejected_rows, 1);
    }

    #[test]
    fn rows_without_a_date_are_rejected() {
        let text = format!(
            "{HEADER}\n{}\n{}\n",
            row("", "General", (1, 1, 1, 1)),
            row("not a date", "General", (1, 1, 1, 1))
        );
        let (reports, load_report) = parse_text(&text);
        assert!(reports.is_empty());
        assert_eq!(load_report.rejected_rows, 2);
    }

    #[test]
    fn missing_facility_column_defaults_to_unknown() {
        // Exactly the minimum width: the facility column is absent.
        let mut cols = vec!["x".to_string(); 20];
        cols[16] = "2021-02-01".into();
        let text = format!("{HEADER}\n{}\n", cols.join(","));
        let (reports, _) = parse_text(&text);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].facility_name, UNKNOWN_FACILITY);
        assert_eq!(reports[0].icu_occupied, 0);
    }

    #[test]
    fn non_numeric_metrics_become_zero() {
        let mut cols = vec!["n/a".to_string(); 21];
        cols[16] = "2021-02-01".into();
        cols[20] = "North".into();
        cols[9] = "-4".into();
        cols[18] = "7".into();
        let text = format!("{HEADER}\n{}\n", cols.join(","));
        let (reports, _) = parse_text(&text);
        let r = &reports[0];
        assert_eq!(r.icu_occupied, 7);
        assert_eq!(r.ward_vacant, 0);
    }

    #[test]
    fn unbalanced_quote_only_costs_its_own_line() {
        let text = format!(
            "{HEADER}\n{}\n{}\n{}\n{}\n",
            row("2021-01-01", "A", (1, 1, 1, 1)),
            row("2021-01-02", "\"St Luke", (1, 1, 1, 1)),
            row("2021-01-03", "B", (1, 1, 1, 1)),
            row("2021-01-04", "C", (1, 1, 1, 1))
        );
        let (reports, load_report) = parse_text(&text);
        let names: Vec<&str> = reports.iter().map(|r| r.facility_name.as_str()).collect();
        assert_eq!(names, ["A", "St Luke", "B", "C"]);
        assert_eq!(load_report.total_rows, 4);
        assert!(reports.iter().all(|r| !r.facility_name.contains('\n')));
    }

    #[test]
    fn unbalanced_quote_mid_row_rejects_only_that_row() {
        let mut bad = vec!["0".to_string(); 21];
        bad[5] = "\"open".into();
        bad[16] = "2021-01-02".into();
        let text = format!(
            "{HEADER}\n{}\n{}\n",
            bad.join(","),
            row("2021-01-03", "B", (1, 1, 1, 1))
        );
        let (reports, load_report) = parse_text(&text);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].facility_name, "B");
        assert_eq!(load_report.total_rows, 2);
        assert_eq!(load_report.rejected_rows, 1);
    }

    #[test]
    fn quoted_commas_stay_in_one_field() {
        let text = format!(
            "{HEADER}\n{}\n",
            row("2021-01-05", "\"Mercy, North\"", (1, 1, 1, 1))
        );
        let (reports, _) = parse_text(&text);
        assert_eq!(reports[0].facility_name, "Mercy, North");
    }

    #[test]
    fn parsing_is_repeatable() {
        let text = format!(
            "{HEADER}\n{}\n{}\n",
            row("2021-01-05", "A", (1, 2, 3, 4)),
            row("2021-01-04", "B", (4, 3, 2, 1))
        );
        assert_eq!(parse_text(&text), parse_text(&text));
    }

    #[test]
    fn acquisition_failures_become_unavailable() {
        let parser = RecordParser::default();
        let missing = acquire_file(&parser, "/definitely/not/here/data.csv");
        assert_eq!(missing, Acquisition::Unavailable);
        assert!(missing.reports().is_empty());
        assert_eq!(acquire_upload(&parser, None), Acquisition::Unavailable);
        assert!(matches!(
            try_load_file(&parser, "/definitely/not/here/data.csv"),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn acquires_uploads_and_files() {
        let parser = RecordParser::default();
        let text = format!("{HEADER}\n{}\n", row("2021-01-05", "A", (1, 2, 3, 4)));

        let upload = acquire_upload(&parser, Some(text.as_bytes()));
        assert_eq!(upload.reports().len(), 1);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, text.as_bytes()).unwrap();
        let loaded = acquire_file(&parser, file.path());
        assert_eq!(loaded.into_reports().len(), 1);
    }

    #[test]
    fn custom_schema_is_validated() {
        let mut schema = ColumnSchema::reference();
        schema.facility = schema.date;
        assert!(RecordParser::new(schema).is_err());
    }
}
