//! The canonical, region-grouped observation store handed to renderers.

use std::collections::BTreeMap;
use std::io;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::LoadResult;
use crate::processing::NormalizeReport;
use crate::types::{CellValue, Observation, RawRow, RawTable};

/// Header of the long-format export.
pub const LONG_HEADER: [&str; 3] = ["region", "date", "value"];

/// Observations sorted by (date, region), plus per-region sequences sorted by date.
///
/// Built once per load and immutable afterwards. Repeated (region, date) pairs are kept in input
/// order unless the normalizer was configured with
/// [`crate::config::DuplicatePolicy::KeepLast`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesIndex {
    observations: Vec<Observation>,
    by_region: BTreeMap<String, Vec<Observation>>,
    /// Region keys in order of first appearance in `observations`.
    #[serde(skip)]
    first_seen: Vec<String>,
    #[serde(skip)]
    report: NormalizeReport,
}

impl SeriesIndex {
    /// Build an index from observations in any order.
    pub fn from_observations(mut observations: Vec<Observation>) -> Self {
        sort_observations(&mut observations);
        let report = NormalizeReport {
            candidates: observations.len(),
            kept: observations.len(),
            ..NormalizeReport::default()
        };
        Self::from_sorted(observations, report)
    }

    /// `observations` must already be sorted with [`sort_observations`].
    pub(crate) fn from_sorted(observations: Vec<Observation>, report: NormalizeReport) -> Self {
        let mut by_region: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
        let mut first_seen = Vec::new();
        for obs in &observations {
            let series = by_region.entry(obs.region.clone()).or_default();
            if series.is_empty() {
                first_seen.push(obs.region.clone());
            }
            series.push(obs.clone());
        }
        Self {
            observations,
            by_region,
            first_seen,
            report,
        }
    }

    /// All observations, ascending by date then region.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct region identifiers, sorted lexicographically.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.by_region.keys().map(String::as_str)
    }

    /// Distinct regions in order of their first observation (earliest date, then region).
    pub fn regions_by_first_appearance(&self) -> impl Iterator<Item = &str> {
        self.first_seen.iter().map(String::as_str)
    }

    pub fn region_count(&self) -> usize {
        self.by_region.len()
    }

    pub fn contains(&self, region: &str) -> bool {
        self.by_region.contains_key(region)
    }

    /// A region's observations, ascending by date.
    pub fn get(&self, region: &str) -> Option<&[Observation]> {
        self.by_region.get(region).map(Vec::as_slice)
    }

    /// Like [`Self::get`], but also hands back the stored key.
    pub(crate) fn entry(&self, region: &str) -> Option<(&str, &[Observation])> {
        self.by_region
            .get_key_value(region)
            .map(|(key, obs)| (key.as_str(), obs.as_slice()))
    }

    /// Iterate `(region, observations)` in region order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Observation])> {
        self.by_region
            .iter()
            .map(|(region, obs)| (region.as_str(), obs.as_slice()))
    }

    /// Most recent observation of a region.
    pub fn latest(&self, region: &str) -> Option<&Observation> {
        self.get(region).and_then(<[Observation]>::last)
    }

    /// Earliest and latest date across all regions.
    pub fn date_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        date_extent(&self.observations)
    }

    /// Smallest and largest value across all regions.
    pub fn value_extent(&self) -> Option<(f64, f64)> {
        value_extent(&self.observations)
    }

    /// Counters collected while normalizing.
    pub fn report(&self) -> &NormalizeReport {
        &self.report
    }

    /// Long-format table (`region,date,value`) holding every observation.
    ///
    /// Normalizing this table again yields the same observations.
    pub fn to_long_table(&self) -> RawTable {
        let header = LONG_HEADER.iter().map(|h| (*h).to_owned()).collect();
        let rows = self
            .observations
            .iter()
            .map(|obs| {
                RawRow::from_pairs([
                    (LONG_HEADER[0], CellValue::Text(obs.region.clone())),
                    (LONG_HEADER[1], CellValue::Text(obs.date.format("%Y-%m-%d").to_string())),
                    (LONG_HEADER[2], CellValue::Number(obs.value)),
                ])
            })
            .collect();
        RawTable::new(header, rows)
    }

    /// Write every observation as long-format CSV with a `region,date,value` header.
    pub fn write_long_csv<W: io::Write>(&self, writer: W) -> LoadResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(LONG_HEADER)?;
        for obs in &self.observations {
            wtr.write_record([
                obs.region.clone(),
                obs.date.format("%Y-%m-%d").to_string(),
                obs.value.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Serialize the index (flat observations + per-region groups) as JSON.
    pub fn write_json<W: io::Write>(&self, writer: W) -> LoadResult<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}

/// Sort ascending by date, ties by region. Stable, so duplicates keep input order.
pub(crate) fn sort_observations(observations: &mut [Observation]) {
    observations.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.region.cmp(&b.region)));
}

pub(crate) fn date_extent(observations: &[Observation]) -> Option<(NaiveDate, NaiveDate)> {
    let first = observations.iter().map(|o| o.date).min()?;
    let last = observations.iter().map(|o| o.date).max()?;
    Some((first, last))
}

pub(crate) fn value_extent(observations: &[Observation]) -> Option<(f64, f64)> {
    observations.iter().map(|o| o.value).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::SeriesIndex;
    use crate::types::Observation;

    fn obs(region: &str, y: i32, m: u32, value: f64) -> Observation {
        Observation::new(region, NaiveDate::from_ymd_opt(y, m, 1).unwrap(), value)
    }

    fn sample() -> SeriesIndex {
        SeriesIndex::from_observations(vec![
            obs("B", 2020, 2, 12.0),
            obs("A", 2020, 2, 22.0),
            obs("B", 2020, 1, 11.0),
            obs("A", 2020, 1, 21.0),
            obs("C", 2019, 12, 5.0),
        ])
    }

    #[test]
    fn flat_sequence_is_sorted_by_date_then_region() {
        let idx = sample();
        let order: Vec<(&str, f64)> = idx
            .observations()
            .iter()
            .map(|o| (o.region.as_str(), o.value))
            .collect();
        assert_eq!(
            order,
            vec![("C", 5.0), ("A", 21.0), ("B", 11.0), ("A", 22.0), ("B", 12.0)]
        );
    }

    #[test]
    fn groups_and_keys() {
        let idx = sample();
        assert_eq!(idx.regions().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(idx.get("A").unwrap().len(), 2);
        assert_eq!(idx.latest("B").unwrap().value, 12.0);
        assert!(idx.contains("C"));
        assert!(!idx.contains("D"));
        assert!(idx.get("D").is_none());
    }

    #[test]
    fn first_appearance_follows_the_flat_sequence() {
        let idx = sample();
        assert_eq!(idx.regions_by_first_appearance().collect::<Vec<_>>(), vec!["C", "A", "B"]);
        assert_eq!(idx.entry("A").map(|(key, obs)| (key, obs.len())), Some(("A", 2)));
        assert!(idx.entry("D").is_none());
    }

    #[test]
    fn extents_cover_all_observations() {
        let idx = sample();
        let (first, last) = idx.date_extent().unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2019, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
        assert_eq!(idx.value_extent(), Some((5.0, 22.0)));
    }

    #[test]
    fn long_csv_export() {
        let idx = SeriesIndex::from_observations(vec![obs("Metro A", 2020, 1, 100.5)]);
        let mut buf = Vec::new();
        idx.write_long_csv(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "region,date,value\nMetro A,2020-01-01,100.5\n"
        );
    }

    #[test]
    fn json_export_uses_iso_dates() {
        let idx = SeriesIndex::from_observations(vec![obs("X", 2021, 1, 50.0)]);
        let mut buf = Vec::new();
        idx.write_json(&mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["observations"][0]["date"], "2021-01-01");
        assert_eq!(v["by_region"]["X"][0]["value"], 50.0);
    }
}
