use crate::types::{
    Availability, ChartPoint, IcuSummary, KpiTotals, Report, ResourceCard, ResourceKind, TableRow,
    Tier, WatchlistEntry,
};
use crate::util::{percent, round1};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sum the eight metrics over `records`.
///
/// Pass a snapshot rather than raw history, or a facility's older reports get
/// counted again.
pub fn kpi_totals(records: &[&Report]) -> KpiTotals {
    records.iter().fold(KpiTotals::default(), |mut acc, r| {
        acc.icu_occupied += u64::from(r.icu_occupied);
        acc.icu_vacant += u64::from(r.icu_vacant);
        acc.vent_occupied += u64::from(r.vent_occupied);
        acc.vent_vacant += u64::from(r.vent_vacant);
        acc.isolation_occupied += u64::from(r.isolation_occupied);
        acc.isolation_vacant += u64::from(r.isolation_vacant);
        acc.ward_occupied += u64::from(r.ward_occupied);
        acc.ward_vacant += u64::from(r.ward_vacant);
        acc
    })
}

impl KpiTotals {
    pub fn total_beds(&self) -> u64 {
        self.icu_occupied + self.icu_vacant
    }

    /// ICU utilization in percent, one decimal place; 0 without beds.
    pub fn utilization_rate(&self) -> f64 {
        round1(percent(self.icu_occupied, self.total_beds()))
    }

    pub fn icu_summary(&self) -> IcuSummary {
        let total_beds = self.total_beds();
        let utilization_rate = self.utilization_rate();
        IcuSummary {
            total_beds,
            occupied: self.icu_occupied,
            available: self.icu_vacant,
            utilization_rate,
            tier: Tier::classify(utilization_rate, total_beds),
            availability: Availability::assess(self.icu_vacant, total_beds),
        }
    }

    /// Ventilator, isolation and ward cards, in that order.
    pub fn resource_cards(&self) -> [ResourceCard; 3] {
        [
            resource_card(ResourceKind::Ventilator, self.vent_occupied, self.vent_vacant),
            resource_card(ResourceKind::Isolation, self.isolation_occupied, self.isolation_vacant),
            resource_card(ResourceKind::Ward, self.ward_occupied, self.ward_vacant),
        ]
    }
}

pub fn resource_card(kind: ResourceKind, occupied: u64, vacant: u64) -> ResourceCard {
    let total = occupied + vacant;
    let utilization = whole_percent(occupied, total);
    ResourceCard {
        kind,
        occupied,
        total,
        utilization,
        tier: Tier::classify(f64::from(utilization), total),
    }
}

/// ICU occupancy summed per report date, ascending.
pub fn series_by_date(records: &[&Report]) -> Vec<ChartPoint> {
    let mut by_date: BTreeMap<_, (u64, u64)> = BTreeMap::new();
    for r in records {
        let e = by_date.entry(r.report_date).or_insert((0, 0));
        e.0 += u64::from(r.icu_occupied);
        e.1 += u64::from(r.icu_vacant);
    }
    by_date
        .into_iter()
        .map(|(date, (icu_occupied, icu_vacant))| ChartPoint {
            date,
            icu_occupied,
            icu_vacant,
        })
        .collect()
}

/// Facilities ranked by ICU utilization, highest first.
///
/// Facilities without any ICU beds are left out. Equal utilizations keep
/// snapshot order, but callers shouldn't rely on that.
pub fn watchlist(snapshot: &[&Report]) -> Vec<WatchlistEntry> {
    let mut entries: Vec<WatchlistEntry> = snapshot
        .iter()
        .filter(|r| r.icu_total() > 0)
        .map(|r| {
            let total = r.icu_total();
            let occupied = u64::from(r.icu_occupied);
            let utilization_pct = percent(occupied, total);
            WatchlistEntry {
                facility_name: r.facility_name.clone(),
                occupied,
                total,
                utilization_pct,
                tier: Tier::classify(utilization_pct, total),
            }
        })
        .collect();
    entries.sort_by(|a, b| {
        b.utilization_pct
            .partial_cmp(&a.utilization_pct)
            .unwrap_or(Ordering::Equal)
    });
    entries
}

/// The first `limit` records as table rows.
pub fn table_rows(records: &[&Report], limit: usize) -> Vec<TableRow> {
    records
        .iter()
        .take(limit)
        .map(|r| {
            let total = r.icu_total();
            let utilization = whole_percent(u64::from(r.icu_occupied), total);
            TableRow {
                report_date: r.report_date,
                facility_name: r.facility_name.clone(),
                icu_occupied: r.icu_occupied,
                vent_occupied: r.vent_occupied,
                ward_occupied: r.ward_occupied,
                utilization,
                tier: Tier::classify(f64::from(utilization), total),
            }
        })
        .collect()
}

fn whole_percent(part: u64, whole: u64) -> u32 {
    percent(part, whole).round() as u32
}
