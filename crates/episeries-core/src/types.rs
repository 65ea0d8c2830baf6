//! Type definitions for canonical series reconciliation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical region-of-interest key
///
/// One key per region, assigned by the [`crate::registry::RegionRegistry`]
/// and immutable once assigned. Country-level regions use the plain country
/// name (`"Italy"`); sub-regions use a country prefix (`"US_MI"`,
/// `"CA_Ontario"`). Every series, artifact and population row is keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionKey(String);

impl RegionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Cumulative metric vocabulary shared by all source adapters
///
/// Adapters reduce whatever their upstream reports to this fixed set before
/// anything downstream sees the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cases,
    Deaths,
    Recovered,
    Tests,
    Vaccinations,
}

impl Metric {
    /// All metrics, in canonical column order
    pub const ALL: [Metric; 5] = [
        Metric::Cases,
        Metric::Deaths,
        Metric::Recovered,
        Metric::Tests,
        Metric::Vaccinations,
    ];

    /// Metrics expected from primary sources (cases/deaths/recoveries);
    /// tests and vaccinations usually arrive later via augmentation.
    pub const PRIMARY: [Metric; 3] = [Metric::Cases, Metric::Deaths, Metric::Recovered];

    /// Column stem used in artifact headers (`cum_<stem>` / `new_<stem>`)
    pub fn column_stem(&self) -> &'static str {
        match self {
            Metric::Cases => "cases",
            Metric::Deaths => "deaths",
            Metric::Recovered => "recover",
            Metric::Tests => "tests",
            Metric::Vaccinations => "vaccinations",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_stem())
    }
}

/// Identity of the upstream source an observation came from
///
/// One variant per adapter. Adding a source means adding a variant here and
/// an adapter module in `episeries-providers`; the repair/derive logic never
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Johns Hopkins CSSE global time series (countries)
    JhuGlobal,
    /// The COVID Tracking Project archived US recovery data
    CovidTracking,
    /// Our World In Data testing observations
    OwidTesting,
    /// Our World In Data vaccination totals
    OwidVaccinations,
    /// OpenCOVID Canada provincial API
    OpenCovidCanada,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceId::JhuGlobal => "jhu_global",
            SourceId::CovidTracking => "covid_tracking",
            SourceId::OwidTesting => "owid_testing",
            SourceId::OwidVaccinations => "owid_vaccinations",
            SourceId::OpenCovidCanada => "opencovid_canada",
        };
        f.write_str(name)
    }
}

// `SourceId` appears as a field named `source` in several `thiserror` error
// enums (e.g. `BuildError::UnprioritizedSource`, `RegistryError::UnknownRegion`).
// thiserror auto-treats any field named `source` as the error's `source()`,
// which requires the field type to implement `std::error::Error`. SourceId is
// a plain data identifier, not an error cause, so this empty impl just
// satisfies that bound; `Error`'s methods all have defaults.
impl std::error::Error for SourceId {}

/// One raw per-region data point as reported by a source adapter
///
/// Never mutated after creation. `value` is `None` when the source carried
/// the date but genuinely reported nothing for it — that is not the same as
/// reporting zero, and the distinction survives all the way to the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Canonical region this observation belongs to
    pub region: RegionKey,

    /// Calendar day the cumulative value was reported for
    pub date: NaiveDate,

    /// Which cumulative metric the value counts
    pub metric: Metric,

    /// Cumulative count through `date`, `None` if unreported
    pub value: Option<i64>,

    /// Adapter that produced this observation
    pub source: SourceId,
}

/// Canonical per-region daily table
///
/// Rows are contiguous by calendar day: row `i` is `start_date + i` days and
/// no date inside the observed range is ever skipped. Missing values are
/// `None` in memory and the `-1` sentinel in artifacts; collapsing either to
/// `0` corrupts downstream fits and is forbidden throughout.
///
/// Lifecycle: created by [`crate::builder::SeriesBuilder`] with cumulative
/// columns populated, repaired by
/// [`crate::repair::MonotonicityRepairer`], daily columns derived by
/// [`crate::deltas::derive_deltas`], optionally extended by
/// [`crate::augment::augment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSeries {
    /// Region this series describes; exactly one series per region
    pub region: RegionKey,

    /// Calendar day of row 0
    pub start_date: NaiveDate,

    /// Cumulative confirmed cases
    pub cum_cases: Vec<Option<i64>>,

    /// Cumulative deaths
    pub cum_deaths: Vec<Option<i64>>,

    /// Cumulative recoveries
    pub cum_recover: Vec<Option<i64>>,

    /// Cumulative tests administered
    pub cum_tests: Vec<Option<i64>>,

    /// Cumulative vaccine doses administered
    pub cum_vaccinations: Vec<Option<i64>>,

    /// Daily new cases (first difference of `cum_cases`)
    pub new_cases: Vec<Option<i64>>,

    /// Daily new deaths
    pub new_deaths: Vec<Option<i64>>,

    /// Daily new recoveries
    pub new_recover: Vec<Option<i64>>,

    /// Daily new tests
    pub new_tests: Vec<Option<i64>>,

    /// Daily new vaccinations
    pub new_vaccinations: Vec<Option<i64>>,

    /// Daily newly-uninfected: `new_recover + new_deaths`, missing if either is
    pub new_uninfected: Vec<Option<i64>>,

    /// Region population estimate, if known
    pub population: Option<i64>,
}

impl CanonicalSeries {
    /// Create an empty series covering `days` contiguous rows from `start_date`
    pub fn with_range(region: RegionKey, start_date: NaiveDate, days: usize) -> Self {
        Self {
            region,
            start_date,
            cum_cases: vec![None; days],
            cum_deaths: vec![None; days],
            cum_recover: vec![None; days],
            cum_tests: vec![None; days],
            cum_vaccinations: vec![None; days],
            new_cases: vec![None; days],
            new_deaths: vec![None; days],
            new_recover: vec![None; days],
            new_tests: vec![None; days],
            new_vaccinations: vec![None; days],
            new_uninfected: vec![None; days],
            population: None,
        }
    }

    /// Number of rows (calendar days) in the series
    pub fn len(&self) -> usize {
        self.cum_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cum_cases.is_empty()
    }

    /// Calendar day of row `index`
    pub fn date(&self, index: usize) -> NaiveDate {
        self.start_date + chrono::Duration::days(index as i64)
    }

    /// Row index of `date`, if it falls inside the series range
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start_date).num_days();
        if offset >= 0 && (offset as usize) < self.len() {
            Some(offset as usize)
        } else {
            None
        }
    }

    /// Cumulative column storage for `metric`
    pub fn cumulative(&self, metric: Metric) -> &[Option<i64>] {
        match metric {
            Metric::Cases => &self.cum_cases,
            Metric::Deaths => &self.cum_deaths,
            Metric::Recovered => &self.cum_recover,
            Metric::Tests => &self.cum_tests,
            Metric::Vaccinations => &self.cum_vaccinations,
        }
    }

    /// Mutable cumulative column storage for `metric`
    pub fn cumulative_mut(&mut self, metric: Metric) -> &mut Vec<Option<i64>> {
        match metric {
            Metric::Cases => &mut self.cum_cases,
            Metric::Deaths => &mut self.cum_deaths,
            Metric::Recovered => &mut self.cum_recover,
            Metric::Tests => &mut self.cum_tests,
            Metric::Vaccinations => &mut self.cum_vaccinations,
        }
    }

    /// Daily (first-difference) column storage for `metric`
    pub fn daily(&self, metric: Metric) -> &[Option<i64>] {
        match metric {
            Metric::Cases => &self.new_cases,
            Metric::Deaths => &self.new_deaths,
            Metric::Recovered => &self.new_recover,
            Metric::Tests => &self.new_tests,
            Metric::Vaccinations => &self.new_vaccinations,
        }
    }

    /// Mutable daily column storage for `metric`
    pub fn daily_mut(&mut self, metric: Metric) -> &mut Vec<Option<i64>> {
        match metric {
            Metric::Cases => &mut self.new_cases,
            Metric::Deaths => &mut self.new_deaths,
            Metric::Recovered => &mut self.new_recover,
            Metric::Tests => &mut self.new_tests,
            Metric::Vaccinations => &mut self.new_vaccinations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn contiguous_date_index() {
        let series = CanonicalSeries::with_range("Italy".into(), day("2020-03-01"), 4);
        assert_eq!(series.len(), 4);
        assert_eq!(series.date(0), day("2020-03-01"));
        assert_eq!(series.date(3), day("2020-03-04"));
        assert_eq!(series.index_of(day("2020-03-02")), Some(1));
        assert_eq!(series.index_of(day("2020-03-05")), None);
        assert_eq!(series.index_of(day("2020-02-29")), None);
    }

    #[test]
    fn column_accessors_cover_all_metrics() {
        let mut series = CanonicalSeries::with_range("US_MI".into(), day("2020-04-01"), 2);
        for metric in Metric::ALL {
            series.cumulative_mut(metric)[0] = Some(7);
            assert_eq!(series.cumulative(metric)[0], Some(7));
            series.daily_mut(metric)[1] = Some(3);
            assert_eq!(series.daily(metric)[1], Some(3));
        }
    }

    #[test]
    fn metric_column_stems_match_artifact_headers() {
        assert_eq!(Metric::Recovered.column_stem(), "recover");
        assert_eq!(Metric::Vaccinations.column_stem(), "vaccinations");
    }
}
