//! Canonical series assembly from raw per-source observations
//!
//! Folds the observations every adapter produced for one region into a
//! single dated, column-aligned table. Conflicts between sources are not
//! merged: the first adapter in the caller-supplied priority order wins a
//! `(date, metric)` slot outright. Days no source reported stay explicitly
//! missing rather than zero.

use crate::types::{CanonicalSeries, Metric, RawObservation, RegionKey, SourceId};
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

/// Series assembly errors
#[derive(Debug, Error)]
pub enum BuildError {
    /// No adapter reported any usable value for the region. The caller must
    /// exclude the region entirely rather than emit a degenerate series.
    #[error("no usable raw data for region {region}")]
    EmptySource { region: RegionKey },

    /// An observation for a different region reached this builder
    #[error("observation for {found} passed to builder for {expected}")]
    ForeignObservation {
        expected: RegionKey,
        found: RegionKey,
    },

    /// An observation came from a source absent from the priority order
    #[error("source {source} missing from priority order")]
    UnprioritizedSource { source: SourceId },

    /// One source reported the same (date, metric) slot twice
    #[error("duplicate {metric} observation from {source} on {date}")]
    DuplicateObservation {
        date: NaiveDate,
        metric: Metric,
        source: SourceId,
    },
}

/// Minimum peak cumulative counts a region must reach to enter a run
///
/// Regions whose best day never reaches these thresholds carry too little
/// signal to fit and are dropped before assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityFilter {
    pub min_cases: i64,
    pub min_recover: i64,
    pub min_deaths: i64,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self {
            min_cases: 5,
            min_recover: 1,
            min_deaths: 0,
        }
    }
}

impl QualityFilter {
    /// Whether a region's observations clear every per-metric minimum
    pub fn passes(&self, observations: &[RawObservation]) -> bool {
        let peak = |metric: Metric| {
            observations
                .iter()
                .filter(|o| o.metric == metric)
                .filter_map(|o| o.value)
                .max()
                .unwrap_or(0)
        };
        peak(Metric::Cases) >= self.min_cases
            && peak(Metric::Recovered) >= self.min_recover
            && peak(Metric::Deaths) >= self.min_deaths
    }
}

/// Assembles one [`CanonicalSeries`] per region from raw observations
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    priority: Vec<SourceId>,
}

impl SeriesBuilder {
    /// Create a builder with the given source priority order
    ///
    /// Earlier sources win `(date, metric)` conflicts. Every source that can
    /// appear in the observations must be listed exactly once.
    pub fn new(priority: Vec<SourceId>) -> Self {
        Self { priority }
    }

    fn rank(&self, source: SourceId) -> Result<usize, BuildError> {
        self.priority
            .iter()
            .position(|s| *s == source)
            .ok_or(BuildError::UnprioritizedSource { source })
    }

    /// Build the canonical table for `region`
    ///
    /// The date range is the union of all observed dates, widened to be
    /// contiguous; every calendar day inside it gets a row. Pure function of
    /// its inputs.
    ///
    /// # Errors
    ///
    /// [`BuildError::EmptySource`] when no observation carries a value;
    /// configuration errors for foreign regions, unknown sources and
    /// duplicate slots.
    pub fn build(
        &self,
        region: &RegionKey,
        observations: &[RawObservation],
    ) -> Result<CanonicalSeries, BuildError> {
        for obs in observations {
            if obs.region != *region {
                return Err(BuildError::ForeignObservation {
                    expected: region.clone(),
                    found: obs.region.clone(),
                });
            }
        }

        if observations.iter().all(|o| o.value.is_none()) {
            return Err(BuildError::EmptySource {
                region: region.clone(),
            });
        }

        // observations is non-empty past this point
        let start = observations.iter().map(|o| o.date).min().expect("non-empty");
        let end = observations.iter().map(|o| o.date).max().expect("non-empty");
        let days = (end - start).num_days() as usize + 1;

        let mut series = CanonicalSeries::with_range(region.clone(), start, days);

        // Winning source rank per occupied (row, metric) slot
        let mut claimed: HashMap<(usize, Metric), (usize, SourceId)> = HashMap::new();

        for obs in observations {
            let rank = self.rank(obs.source)?;
            let row = (obs.date - start).num_days() as usize;
            match claimed.get(&(row, obs.metric)) {
                Some((_, holder)) if *holder == obs.source => {
                    return Err(BuildError::DuplicateObservation {
                        date: obs.date,
                        metric: obs.metric,
                        source: obs.source,
                    });
                }
                Some((held_rank, _)) if *held_rank <= rank => continue,
                _ => {}
            }
            claimed.insert((row, obs.metric), (rank, obs.source));
            series.cumulative_mut(obs.metric)[row] = obs.value;
        }

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn obs(
        region: &str,
        date: &str,
        metric: Metric,
        value: Option<i64>,
        source: SourceId,
    ) -> RawObservation {
        RawObservation {
            region: region.into(),
            date: day(date),
            metric,
            value,
            source,
        }
    }

    fn builder() -> SeriesBuilder {
        SeriesBuilder::new(vec![SourceId::JhuGlobal, SourceId::CovidTracking])
    }

    #[test]
    fn widens_gapped_dates_to_contiguous_rows() {
        let region: RegionKey = "Italy".into();
        let observations = vec![
            obs("Italy", "2020-03-01", Metric::Cases, Some(10), SourceId::JhuGlobal),
            // 2020-03-02 unreported by every source
            obs("Italy", "2020-03-03", Metric::Cases, Some(30), SourceId::JhuGlobal),
        ];
        let series = builder().build(&region, &observations).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.cum_cases, vec![Some(10), None, Some(30)]);
    }

    #[test]
    fn first_source_in_priority_wins_conflicts() {
        let region: RegionKey = "US_MI".into();
        let observations = vec![
            obs("US_MI", "2020-04-01", Metric::Recovered, Some(5), SourceId::CovidTracking),
            obs("US_MI", "2020-04-01", Metric::Recovered, Some(9), SourceId::JhuGlobal),
        ];
        let series = builder().build(&region, &observations).unwrap();
        // JhuGlobal outranks CovidTracking in the priority order above
        assert_eq!(series.cum_recover[0], Some(9));
    }

    #[test]
    fn lower_priority_source_fills_untouched_slots() {
        let region: RegionKey = "US_MI".into();
        let observations = vec![
            obs("US_MI", "2020-04-01", Metric::Cases, Some(100), SourceId::JhuGlobal),
            obs("US_MI", "2020-04-01", Metric::Recovered, Some(3), SourceId::CovidTracking),
        ];
        let series = builder().build(&region, &observations).unwrap();
        assert_eq!(series.cum_cases[0], Some(100));
        assert_eq!(series.cum_recover[0], Some(3));
    }

    #[test]
    fn empty_observations_fail_with_empty_source() {
        let region: RegionKey = "Italy".into();
        let err = builder().build(&region, &[]).unwrap_err();
        assert!(matches!(err, BuildError::EmptySource { .. }));
    }

    #[test]
    fn all_missing_values_fail_with_empty_source() {
        let region: RegionKey = "Italy".into();
        let observations = vec![
            obs("Italy", "2020-03-01", Metric::Tests, None, SourceId::JhuGlobal),
        ];
        let err = builder().build(&region, &observations).unwrap_err();
        assert!(matches!(err, BuildError::EmptySource { .. }));
    }

    #[test]
    fn duplicate_slot_from_one_source_is_a_configuration_error() {
        let region: RegionKey = "Italy".into();
        let observations = vec![
            obs("Italy", "2020-03-01", Metric::Cases, Some(1), SourceId::JhuGlobal),
            obs("Italy", "2020-03-01", Metric::Cases, Some(2), SourceId::JhuGlobal),
        ];
        let err = builder().build(&region, &observations).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateObservation { .. }));
    }

    #[test]
    fn foreign_region_rejected() {
        let region: RegionKey = "Italy".into();
        let observations = vec![
            obs("France", "2020-03-01", Metric::Cases, Some(1), SourceId::JhuGlobal),
        ];
        let err = builder().build(&region, &observations).unwrap_err();
        assert!(matches!(err, BuildError::ForeignObservation { .. }));
    }

    #[test]
    fn quality_filter_defaults_match_primary_feed_minimums() {
        let filter = QualityFilter::default();
        let observations = vec![
            obs("Italy", "2020-03-01", Metric::Cases, Some(5), SourceId::JhuGlobal),
            obs("Italy", "2020-03-01", Metric::Recovered, Some(1), SourceId::JhuGlobal),
        ];
        assert!(filter.passes(&observations));

        let too_small = vec![
            obs("Nauru", "2020-03-01", Metric::Cases, Some(4), SourceId::JhuGlobal),
            obs("Nauru", "2020-03-01", Metric::Recovered, Some(1), SourceId::JhuGlobal),
        ];
        assert!(!filter.passes(&too_small));
    }
}
