use crate::types::Report;
use std::collections::HashMap;

/// Reduce a subset to the most recent report per facility.
///
/// The later date wins. On an exact date tie the report that comes later in
/// `reports` wins. Facilities are returned in order of first appearance.
pub fn latest_per_facility<'a>(reports: &[&'a Report]) -> Vec<&'a Report> {
    let mut slot_of: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<&'a Report> = Vec::new();

    for &report in reports {
        match slot_of.get(report.facility_name.as_str()) {
            Some(&slot) => {
                if report.report_date >= latest[slot].report_date {
                    latest[slot] = report;
                }
            }
            None => {
                slot_of.insert(report.facility_name.as_str(), latest.len());
                latest.push(report);
            }
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn report(day: u32, facility: &str, icu_occupied: u32) -> Report {
        Report {
            report_date: NaiveDate::from_ymd_opt(2021, 6, day).unwrap(),
            facility_name: facility.to_string(),
            icu_occupied,
            icu_vacant: 0,
            vent_occupied: 0,
            vent_vacant: 0,
            isolation_occupied: 0,
            isolation_vacant: 0,
            ward_occupied: 0,
            ward_vacant: 0,
        }
    }

    #[test]
    fn keeps_one_report_per_facility_with_max_date() {
        let rows = [
            report(3, "A", 1),
            report(1, "B", 2),
            report(1, "A", 3),
            report(5, "B", 4),
            report(2, "C", 5),
        ];
        let refs: Vec<&Report> = rows.iter().collect();
        let snapshot = latest_per_facility(&refs);

        let picked: Vec<(&str, u32)> = snapshot
            .iter()
            .map(|r| (r.facility_name.as_str(), r.report_date.day()))
            .collect();
        assert_eq!(picked, [("A", 3), ("B", 5), ("C", 2)]);
    }

    #[test]
    fn date_ties_go_to_the_later_input() {
        let rows = [report(4, "A", 10), report(4, "A", 20), report(2, "A", 30)];
        let refs: Vec<&Report> = rows.iter().collect();
        let snapshot = latest_per_facility(&refs);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].icu_occupied, 20);
    }

    #[test]
    fn empty_input_gives_empty_snapshot() {
        assert!(latest_per_facility(&[]).is_empty());
    }
}
