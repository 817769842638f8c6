//! Date-wise and region-wise aggregation of the filtered record set.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::records::CaseRecord;

/// One date of a daily time series, with the derived recovery-rate
/// percentage. The rate is `None` when no case has been confirmed yet; a
/// numeric zero would misread as "nobody recovered".
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeriesPoint {
    pub date: NaiveDate,
    pub confirmed: u64,
    pub cured: u64,
    pub deaths: u64,
    pub recovery_rate: Option<f64>,
}

/// All-time totals for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub region: String,
    pub confirmed: u64,
    pub cured: u64,
    pub deaths: u64,
    pub recovery_rate: Option<f64>,
}

pub(crate) fn recovery_rate(cured: u64, confirmed: u64) -> Option<f64> {
    (confirmed > 0).then(|| cured as f64 / confirmed as f64 * 100.0)
}

#[derive(Default)]
struct Totals {
    confirmed: u64,
    cured: u64,
    deaths: u64,
}

impl Totals {
    fn add(&mut self, r: &CaseRecord) {
        self.confirmed += r.confirmed;
        self.cured += r.cured;
        self.deaths += r.deaths;
    }
}

/// Sums confirmed/cured/deaths across all regions per date, chronologically.
pub fn national_daily(records: &[CaseRecord]) -> Vec<DailySeriesPoint> {
    daily_points(records.iter())
}

/// Daily series for one region. A region may appear more than once on the
/// same date in the source; those rows sum.
pub fn regional_daily(records: &[CaseRecord], region: &str) -> Vec<DailySeriesPoint> {
    daily_points(records.iter().filter(|r| r.region == region))
}

fn daily_points<'a>(records: impl Iterator<Item = &'a CaseRecord>) -> Vec<DailySeriesPoint> {
    let mut by_date: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for r in records {
        by_date.entry(r.date).or_default().add(r);
    }
    by_date
        .into_iter()
        .map(|(date, t)| DailySeriesPoint {
            date,
            confirmed: t.confirmed,
            cured: t.cured,
            deaths: t.deaths,
            recovery_rate: recovery_rate(t.cured, t.confirmed),
        })
        .collect()
}

/// All-time totals per region, for cross-region comparison. Callers sort by
/// the metric they chart.
pub fn region_summaries(records: &[CaseRecord]) -> Vec<RegionSummary> {
    let mut by_region: BTreeMap<&str, Totals> = BTreeMap::new();
    for r in records {
        by_region.entry(&r.region).or_default().add(r);
    }
    by_region
        .into_iter()
        .map(|(region, t)| RegionSummary {
            region: region.to_string(),
            confirmed: t.confirmed,
            cured: t.cured,
            deaths: t.deaths,
            recovery_rate: recovery_rate(t.cured, t.confirmed),
        })
        .collect()
}
