use crate::dashboard::DashboardView;
use crate::types::{
    CardDisplay, IcuSummary, SeriesDisplay, TableRow, TableRowDisplay, WatchlistDisplay,
    WatchlistEntry,
};
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn table_display(rows: &[TableRow]) -> Vec<TableRowDisplay> {
    rows.iter()
        .map(|r| TableRowDisplay {
            report_date: r.report_date.format("%Y-%m-%d").to_string(),
            facility: r.facility_name.clone(),
            icu_occupied: r.icu_occupied,
            vent_occupied: r.vent_occupied,
            ward_occupied: r.ward_occupied,
            utilization: format!("{}% ({})", r.utilization, r.tier),
        })
        .collect()
}

pub fn watchlist_display(entries: &[WatchlistEntry]) -> Vec<WatchlistDisplay> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, e)| WatchlistDisplay {
            rank: idx + 1,
            facility: e.facility_name.clone(),
            occupancy: format!("{} / {}", format_int(e.occupied), format_int(e.total)),
            utilization: format!("{}%", format_number(e.utilization_pct, 1)),
            status: e.tier.to_string(),
        })
        .collect()
}

pub fn cards_display(view: &DashboardView) -> Vec<CardDisplay> {
    let icu = icu_card(&view.icu);
    let mut cards = vec![icu];
    cards.extend(view.resources.iter().map(|c| CardDisplay {
        resource: c.kind.label().to_string(),
        in_use: format_int(c.occupied),
        total: format_int(c.total),
        utilization: format!("{}%", c.utilization),
        status: c.tier.to_string(),
    }));
    cards
}

fn icu_card(icu: &IcuSummary) -> CardDisplay {
    let status = match icu.availability.label() {
        "" => icu.tier.to_string(),
        flag => format!("{} / {}", icu.tier, flag),
    };
    CardDisplay {
        resource: "ICU Beds".to_string(),
        in_use: format_int(icu.occupied),
        total: format_int(icu.total_beds),
        utilization: format!("{}%", format_number(icu.utilization_rate, 1)),
        status,
    }
}

pub fn series_display(view: &DashboardView) -> Vec<SeriesDisplay> {
    let cell = |v: Option<u64>| v.map(format_int).unwrap_or_default();
    view.chart
        .iter()
        .map(|p| SeriesDisplay {
            date: p.date.format("%Y-%m-%d").to_string(),
            actual: cell(p.actual),
            forecast: cell(p.forecast),
        })
        .collect()
}

/// Print markdown previews of every part of a view.
pub fn print_dashboard(view: &DashboardView, preview_rows: usize) {
    println!(
        "Capacity overview ({} facilities reporting, {} matching reports, facility: {})\n",
        format_int(view.facilities_reporting),
        format_int(view.matched),
        view.criteria.facility
    );
    preview_table_rows(&cards_display(view), 4);

    match &view.watchlist {
        Some(list) if list.is_empty() => println!("Watchlist: no data available.\n"),
        Some(list) => {
            println!("Watchlist (highest ICU utilization first)\n");
            preview_table_rows(&watchlist_display(list), preview_rows);
        }
        None => {}
    }

    match &view.forecast {
        Some(_) => println!("ICU occupancy with 7-day forecast\n"),
        None => println!("ICU occupancy (not enough data for a forecast)\n"),
    }
    let series = series_display(view);
    let tail = series.len().saturating_sub(preview_rows);
    preview_table_rows(&series[tail..], preview_rows);

    println!(
        "Records (showing up to {} of {})\n",
        format_int(preview_rows.min(view.table.len())),
        format_int(view.matched)
    );
    preview_table_rows(&table_display(&view.table), preview_rows);
}

/// Write the table, watchlist and full view into `dir`.
pub fn export_dashboard(dir: &Path, view: &DashboardView) -> Result<Vec<String>, Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let table = dir.join("table.csv");
    write_csv(&table, &table_display(&view.table))?;
    written.push(table.display().to_string());

    if let Some(list) = &view.watchlist {
        let path = dir.join("watchlist.csv");
        write_csv(&path, &watchlist_display(list))?;
        written.push(path.display().to_string());
    }

    let json = dir.join("dashboard.json");
    write_json(&json, view)?;
    written.push(json.display().to_string());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Dashboard;
    use crate::loader::Acquisition;
    use crate::types::Report;
    use chrono::NaiveDate;

    fn view() -> DashboardView {
        let report = |day, facility: &str, occ, vac| Report {
            report_date: NaiveDate::from_ymd_opt(2021, 10, day).unwrap(),
            facility_name: facility.to_string(),
            icu_occupied: occ,
            icu_vacant: vac,
            vent_occupied: 2,
            vent_vacant: 2,
            isolation_occupied: 0,
            isolation_vacant: 0,
            ward_occupied: 10,
            ward_vacant: 0,
        };
        let mut dashboard = Dashboard::default();
        dashboard.ingest(Acquisition::Loaded {
            reports: vec![report(1, "A", 9, 1), report(1, "B", 2, 2), report(2, "B", 3, 1)],
            load_report: Default::default(),
        });
        dashboard
            .view_at(
                &dashboard.default_criteria(),
                NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn watchlist_rows_are_ranked_and_formatted() {
        let view = view();
        let rows = watchlist_display(view.watchlist.as_deref().unwrap());
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].facility, "A");
        assert_eq!(rows[0].occupancy, "9 / 10");
        assert_eq!(rows[0].utilization, "90.0%");
        assert_eq!(rows[0].status, "CRITICAL");
        assert_eq!(rows[1].status, "WARNING");
    }

    #[test]
    fn cards_start_with_icu() {
        let cards = cards_display(&view());
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].resource, "ICU Beds");
        assert_eq!(cards[0].utilization, "85.7%");
        assert_eq!(cards[0].status, "CRITICAL / RUNNING LOW");
        assert_eq!(cards[3].status, "CRITICAL");
    }

    #[test]
    fn export_writes_table_watchlist_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_dashboard(dir.path(), &view()).unwrap();
        assert_eq!(written.len(), 3);

        let table = std::fs::read_to_string(dir.path().join("table.csv")).unwrap();
        assert!(table.starts_with("ReportDate,Facility,IcuOccupied"));
        assert_eq!(table.lines().count(), 4);

        let json: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("dashboard.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(json["totals"]["icu_occupied"], 12);
        assert_eq!(json["icu"]["tier"], "CRITICAL");
    }
}
