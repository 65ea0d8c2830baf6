//! Static lookup-table loaders feeding the region registry
//!
//! Two read-only tables ship with every run, both keyed by the same
//! canonical ROI vocabulary as the artifacts: `population_estimates.csv`
//! (`roi,population`) and `country_iso_codes.csv`
//! (`Country,Alpha-3 code`).

use episeries_core::registry::RegionRegistry;
use episeries_core::types::RegionKey;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Static-table loading errors
#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error in {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("IO error opening {table}: {source}")]
    Io {
        table: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Deserialize)]
struct PopulationRow {
    roi: String,
    population: i64,
}

#[derive(Debug, Deserialize)]
struct IsoCodeRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Alpha-3 code")]
    alpha3: String,
}

fn table_name(path: &Path) -> String {
    path.display().to_string()
}

/// Load `population_estimates.csv` rows
pub fn load_population_table(path: &Path) -> Result<Vec<(RegionKey, i64)>, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        table: table_name(path),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: PopulationRow = record.map_err(|source| TableError::Csv {
            table: table_name(path),
            source,
        })?;
        rows.push((RegionKey::new(row.roi), row.population));
    }
    Ok(rows)
}

/// Load `country_iso_codes.csv` rows as `(alpha3, country)` pairs
pub fn load_iso_table(path: &Path) -> Result<Vec<(String, String)>, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        table: table_name(path),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: IsoCodeRow = record.map_err(|source| TableError::Csv {
            table: table_name(path),
            source,
        })?;
        rows.push((row.alpha3, row.country));
    }
    Ok(rows)
}

/// Build a fully-populated registry from the two static tables
///
/// The registry starts from the built-in US state table; the ISO table adds
/// country names and alpha-3 codes, the population table attaches counts.
pub fn registry_from_tables(
    iso_path: &Path,
    population_path: &Path,
) -> Result<RegionRegistry, TableError> {
    let mut registry = RegionRegistry::new();
    let iso = load_iso_table(iso_path)?;
    for (alpha3, country) in &iso {
        registry.add_alpha3(alpha3, country);
    }
    let population = load_population_table(population_path)?;
    debug!(
        countries = iso.len(),
        population_rows = population.len(),
        "registry tables loaded"
    );
    for (roi, count) in population {
        registry.add_population(roi, count);
    }
    Ok(registry)
}
