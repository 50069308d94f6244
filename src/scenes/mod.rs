//! Renderer-agnostic models of the three chart scenes.
//!
//! Each scene borrows from a [`SeriesIndex`] and carries the data and axis domains a renderer
//! needs; drawing itself happens behind the [`Renderer`] trait.
//!
//! - [`TrendScene`]: up to three regions as lines over the full date range.
//! - [`SnapshotScene`]: the most recent value per region, ranked, top 15.
//! - [`DrilldownScene`]: one region's series with first/last annotations.

mod session;

use chrono::NaiveDate;

use crate::series::{date_extent, value_extent, SeriesIndex};
use crate::types::Observation;

pub use session::Session;

/// Regions shown first when present, in this order.
pub const PREFERRED_REGIONS: [&str; 3] = ["New York", "Los Angeles", "Chicago"];
/// Lines in the trend scene.
pub const TREND_REGION_COUNT: usize = 3;
/// Bars in the snapshot scene.
pub const SNAPSHOT_TOP_N: usize = 15;

/// Which scene is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneKind {
    #[default]
    Trend,
    Snapshot,
    Drilldown,
}

/// One region's line in the trend scene.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine<'a> {
    pub region: &'a str,
    pub points: &'a [Observation],
}

impl TrendLine<'_> {
    /// The point the region label is anchored to.
    pub fn last(&self) -> Option<&Observation> {
        self.points.last()
    }
}

/// Multi-region trend lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendScene<'a> {
    pub lines: Vec<TrendLine<'a>>,
    /// Date extent of every observation in the index.
    pub x_domain: (NaiveDate, NaiveDate),
    /// `[min * 0.95, max * 1.05]` over every observation in the index.
    pub y_domain: (f64, f64),
}

impl<'a> TrendScene<'a> {
    /// `None` when the index is empty.
    pub fn build(index: &'a SeriesIndex) -> Option<Self> {
        let x_domain = index.date_extent()?;
        let (lo, hi) = index.value_extent()?;
        let lines = trend_regions(index)
            .into_iter()
            .filter_map(|region| index.get(region).map(|points| TrendLine { region, points }))
            .collect();
        Some(Self {
            lines,
            x_domain,
            y_domain: (lo * 0.95, hi * 1.05),
        })
    }
}

/// Preferred regions that are present, topped up in order of first appearance.
pub fn trend_regions(index: &SeriesIndex) -> Vec<&str> {
    let mut regions: Vec<&str> = PREFERRED_REGIONS
        .iter()
        .filter_map(|preferred| index.entry(preferred).map(|(key, _)| key))
        .collect();
    for key in index.regions_by_first_appearance() {
        if regions.len() >= TREND_REGION_COUNT {
            break;
        }
        if !regions.contains(&key) {
            regions.push(key);
        }
    }
    regions.truncate(TREND_REGION_COUNT);
    regions
}

/// One bar of the snapshot ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotBar<'a> {
    pub region: &'a str,
    pub date: NaiveDate,
    pub value: f64,
}

/// Ranked bar chart of each region's most recent value.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotScene<'a> {
    /// Descending by value; ties keep first-appearance order.
    pub bars: Vec<SnapshotBar<'a>>,
    /// `[0, max]` over the shown bars.
    pub y_domain: (f64, f64),
}

impl<'a> SnapshotScene<'a> {
    pub fn build(index: &'a SeriesIndex) -> Option<Self> {
        let mut bars: Vec<SnapshotBar<'a>> = index
            .regions_by_first_appearance()
            .filter_map(|region| {
                let (region, points) = index.entry(region)?;
                points.last().map(|o| SnapshotBar {
                    region,
                    date: o.date,
                    value: o.value,
                })
            })
            .collect();
        // Stable, so equal values stay in first-appearance order.
        bars.sort_by(|a, b| b.value.total_cmp(&a.value));
        bars.truncate(SNAPSHOT_TOP_N);

        let max = bars.iter().map(|b| b.value).reduce(f64::max)?;
        Some(Self {
            bars,
            y_domain: (0.0, max),
        })
    }
}

/// A labelled point (first/last of a drill-down).
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub date: NaiveDate,
    pub value: f64,
    /// `YYYY-MM`
    pub label: String,
}

impl Annotation {
    fn at(obs: &Observation) -> Self {
        Self {
            date: obs.date,
            value: obs.value,
            label: obs.date.format("%Y-%m").to_string(),
        }
    }
}

/// Single-region line with first/last annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct DrilldownScene<'a> {
    pub region: &'a str,
    pub points: &'a [Observation],
    pub x_domain: (NaiveDate, NaiveDate),
    pub y_domain: (f64, f64),
    pub first: Annotation,
    pub last: Annotation,
}

impl<'a> DrilldownScene<'a> {
    /// `None` when `region` is not in the index.
    pub fn build(index: &'a SeriesIndex, region: &str) -> Option<Self> {
        let (key, points) = index.entry(region)?;
        Some(Self {
            region: key,
            points,
            x_domain: date_extent(points)?,
            y_domain: value_extent(points)?,
            first: Annotation::at(points.first()?),
            last: Annotation::at(points.last()?),
        })
    }
}

/// A scene ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Scene<'a> {
    Trend(TrendScene<'a>),
    Snapshot(SnapshotScene<'a>),
    Drilldown(DrilldownScene<'a>),
}

impl Scene<'_> {
    pub fn kind(&self) -> SceneKind {
        match self {
            Self::Trend(_) => SceneKind::Trend,
            Self::Snapshot(_) => SceneKind::Snapshot,
            Self::Drilldown(_) => SceneKind::Drilldown,
        }
    }

    /// Heading shown above the chart.
    pub fn title(&self) -> String {
        match self {
            Self::Trend(t) => format!("House Price Trends: {}", region_list(&t.lines)),
            Self::Snapshot(_) => "Most Recent Index: Top Regions".to_string(),
            Self::Drilldown(d) => format!("House Price Trend: {}", d.region),
        }
    }
}

fn region_list(lines: &[TrendLine<'_>]) -> String {
    lines.iter().map(|l| l.region).collect::<Vec<_>>().join(", ")
}

/// Draws scenes. Implemented outside this crate (SVG, canvas, terminal, ...).
pub trait Renderer {
    type Error;

    fn render(&mut self, scene: &Scene<'_>) -> Result<(), Self::Error>;
}
