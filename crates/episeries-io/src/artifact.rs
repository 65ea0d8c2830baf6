//! Canonical per-region CSV artifacts
//!
//! One artifact per region, named `covidtimeseries_<ROI>.csv`, one row per
//! calendar day sorted ascending. Integer cells use `-1` as the missing
//! sentinel; in memory that is `None`. Dates are formatted `%m/%d/%y` to
//! stay drop-in compatible with the historical artifact layout consumers
//! already parse.

use chrono::NaiveDate;
use episeries_core::types::{CanonicalSeries, RegionKey};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Artifact date format (`03/01/20`)
const DATE_FORMAT: &str = "%m/%d/%y";

/// Artifact read/write errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unparseable artifact date '{value}'")]
    BadDate { value: String },

    /// Rows must be contiguous calendar days; a skipped row means the
    /// artifact was produced or edited by something that broke the contract.
    #[error("artifact rows skip from {prev} to {next}; days must be contiguous")]
    NonContiguousRows { prev: NaiveDate, next: NaiveDate },

    #[error("artifact {path} contains no rows")]
    Empty { path: PathBuf },
}

/// One artifact row; field order is the column order on disk
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactRow {
    date: String,
    cum_cases: i64,
    new_cases: i64,
    cum_deaths: i64,
    new_deaths: i64,
    cum_recover: i64,
    new_recover: i64,
    new_uninfected: i64,
    cum_tests: i64,
    new_tests: i64,
    cum_vaccinations: i64,
    new_vaccinations: i64,
    population: i64,
}

fn sentinel(value: Option<i64>) -> i64 {
    value.unwrap_or(-1)
}

fn from_sentinel(value: i64) -> Option<i64> {
    (value != -1).then_some(value)
}

/// Artifact file name for a canonical region key
pub fn artifact_file_name(region: &RegionKey) -> String {
    format!("covidtimeseries_{}.csv", region)
}

/// Full artifact path under `dir` for a canonical region key
pub fn artifact_path(dir: &Path, region: &RegionKey) -> PathBuf {
    dir.join(artifact_file_name(region))
}

/// Write a finalized series to its artifact under `dir`
pub fn write_series(series: &CanonicalSeries, dir: &Path) -> Result<PathBuf, ArtifactError> {
    let path = artifact_path(dir, &series.region);
    let mut writer = csv::Writer::from_writer(File::create(&path)?);

    for i in 0..series.len() {
        writer.serialize(ArtifactRow {
            date: series.date(i).format(DATE_FORMAT).to_string(),
            cum_cases: sentinel(series.cum_cases[i]),
            new_cases: sentinel(series.new_cases[i]),
            cum_deaths: sentinel(series.cum_deaths[i]),
            new_deaths: sentinel(series.new_deaths[i]),
            cum_recover: sentinel(series.cum_recover[i]),
            new_recover: sentinel(series.new_recover[i]),
            new_uninfected: sentinel(series.new_uninfected[i]),
            cum_tests: sentinel(series.cum_tests[i]),
            new_tests: sentinel(series.new_tests[i]),
            cum_vaccinations: sentinel(series.cum_vaccinations[i]),
            new_vaccinations: sentinel(series.new_vaccinations[i]),
            population: sentinel(series.population),
        })?;
    }
    writer.flush()?;

    info!(region = %series.region, rows = series.len(), path = %path.display(), "wrote artifact");
    Ok(path)
}

/// Read an artifact back into a [`CanonicalSeries`]
///
/// # Errors
///
/// Fails on unparseable dates and on any skipped calendar day — consumers
/// rely on row `i` being exactly `start_date + i`.
pub fn read_series(dir: &Path, region: &RegionKey) -> Result<CanonicalSeries, ArtifactError> {
    let path = artifact_path(dir, region);
    let mut reader = csv::Reader::from_reader(File::open(&path)?);

    let mut rows: Vec<(NaiveDate, ArtifactRow)> = Vec::new();
    for record in reader.deserialize() {
        let row: ArtifactRow = record?;
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|_| {
            ArtifactError::BadDate {
                value: row.date.clone(),
            }
        })?;
        if let Some((prev, _)) = rows.last() {
            if (date - *prev).num_days() != 1 {
                return Err(ArtifactError::NonContiguousRows {
                    prev: *prev,
                    next: date,
                });
            }
        }
        rows.push((date, row));
    }

    let Some((start_date, first)) = rows.first() else {
        return Err(ArtifactError::Empty { path });
    };

    let mut series = CanonicalSeries::with_range(region.clone(), *start_date, rows.len());
    series.population = from_sentinel(first.population);
    for (i, (_, row)) in rows.iter().enumerate() {
        series.cum_cases[i] = from_sentinel(row.cum_cases);
        series.new_cases[i] = from_sentinel(row.new_cases);
        series.cum_deaths[i] = from_sentinel(row.cum_deaths);
        series.new_deaths[i] = from_sentinel(row.new_deaths);
        series.cum_recover[i] = from_sentinel(row.cum_recover);
        series.new_recover[i] = from_sentinel(row.new_recover);
        series.new_uninfected[i] = from_sentinel(row.new_uninfected);
        series.cum_tests[i] = from_sentinel(row.cum_tests);
        series.new_tests[i] = from_sentinel(row.new_tests);
        series.cum_vaccinations[i] = from_sentinel(row.cum_vaccinations);
        series.new_vaccinations[i] = from_sentinel(row.new_vaccinations);
    }
    Ok(series)
}
