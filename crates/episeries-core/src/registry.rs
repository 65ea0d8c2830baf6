//! Region registry: source identifiers to canonical region keys
//!
//! Upstream sources disagree about how to name a region: JHU uses country
//! and state names, OWID uses ISO alpha-3 codes, OpenCOVID uses short
//! province names. The registry is the single mapping from any of those to
//! one canonical [`RegionKey`], constructed once per batch run and read-only
//! for the duration of processing. It never guesses: an identifier it has no
//! mapping for is an error the caller decides how to handle.

use crate::types::{RegionKey, SourceId};
use std::collections::HashMap;
use thiserror::Error;

/// Registry lookup errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Identifier has no canonical mapping
    #[error("unknown region identifier '{identifier}' from source {source}")]
    UnknownRegion {
        identifier: String,
        source: SourceId,
    },
}

/// US states and territories to canonical `US_*` keys
///
/// Mirrors the state-level reduction used by the US feeds; county rows are
/// already summed to state level before resolution.
pub const US_STATE_KEYS: &[(&str, &str)] = &[
    ("Alabama", "US_AL"),
    ("Alaska", "US_AK"),
    ("American Samoa", "US_AS"),
    ("Arizona", "US_AZ"),
    ("Arkansas", "US_AR"),
    ("California", "US_CA"),
    ("Colorado", "US_CO"),
    ("Connecticut", "US_CT"),
    ("Delaware", "US_DE"),
    ("District of Columbia", "US_DC"),
    ("Florida", "US_FL"),
    ("Georgia", "US_GA"),
    ("Guam", "US_GU"),
    ("Hawaii", "US_HI"),
    ("Idaho", "US_ID"),
    ("Illinois", "US_IL"),
    ("Indiana", "US_IN"),
    ("Iowa", "US_IA"),
    ("Kansas", "US_KS"),
    ("Kentucky", "US_KY"),
    ("Louisiana", "US_LA"),
    ("Maine", "US_ME"),
    ("Maryland", "US_MD"),
    ("Massachusetts", "US_MA"),
    ("Michigan", "US_MI"),
    ("Minnesota", "US_MN"),
    ("Mississippi", "US_MS"),
    ("Missouri", "US_MO"),
    ("Montana", "US_MT"),
    ("Nebraska", "US_NE"),
    ("Nevada", "US_NV"),
    ("New Hampshire", "US_NH"),
    ("New Jersey", "US_NJ"),
    ("New Mexico", "US_NM"),
    ("New York", "US_NY"),
    ("North Carolina", "US_NC"),
    ("North Dakota", "US_ND"),
    ("Northern Mariana Islands", "US_MP"),
    ("Ohio", "US_OH"),
    ("Oklahoma", "US_OK"),
    ("Oregon", "US_OR"),
    ("Pennsylvania", "US_PA"),
    ("Puerto Rico", "US_PR"),
    ("Rhode Island", "US_RI"),
    ("South Carolina", "US_SC"),
    ("South Dakota", "US_SD"),
    ("Tennessee", "US_TN"),
    ("Texas", "US_TX"),
    ("Utah", "US_UT"),
    ("Vermont", "US_VT"),
    ("Virgin Islands", "US_VI"),
    ("Virginia", "US_VA"),
    ("Washington", "US_WA"),
    ("West Virginia", "US_WV"),
    ("Wisconsin", "US_WI"),
    ("Wyoming", "US_WY"),
];

/// Regions dropped from every run: cruise ships, micro-states with unusable
/// reporting, and the aggregate "US" row that duplicates the state feeds.
pub const EXCLUDED_REGIONS: &[&str] = &[
    "Diamond Princess",
    "Grand Princess",
    "MS Zaandam",
    "Samoa",
    "Vanuatu",
    "Marshall Islands",
    "Micronesia",
    "Kiribati",
    "US",
    "US_AS",
];

/// Static identifier-to-key mapping plus per-region population counts
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    lookup: HashMap<String, RegionKey>,
    population: HashMap<RegionKey, i64>,
}

impl RegionRegistry {
    /// Empty registry with the built-in US state table preloaded
    pub fn new() -> Self {
        let mut registry = Self::default();
        for (name, key) in US_STATE_KEYS {
            registry
                .lookup
                .insert((*name).to_string(), RegionKey::new(*key));
            // Keys resolve to themselves so state-level feeds that already
            // emit US_XX round-trip.
            registry
                .lookup
                .insert((*key).to_string(), RegionKey::new(*key));
        }
        registry
    }

    /// Register a whole-country region whose canonical key is its name
    pub fn add_country(&mut self, name: &str) {
        self.lookup
            .insert(name.to_string(), RegionKey::new(name));
    }

    /// Register an ISO alpha-3 code for an already-canonical country name
    ///
    /// Rows come from the `country_iso_codes.csv` static table.
    pub fn add_alpha3(&mut self, code: &str, country: &str) {
        self.lookup
            .insert(code.to_string(), RegionKey::new(country));
        self.add_country(country);
    }

    /// Register a sub-region under a country prefix, e.g. `CA_Ontario`
    pub fn add_subregion(&mut self, source_name: &str, key: &str) {
        self.lookup
            .insert(source_name.to_string(), RegionKey::new(key));
    }

    /// Attach a population estimate to a canonical key
    ///
    /// Rows come from the `population_estimates.csv` static table.
    pub fn add_population(&mut self, key: RegionKey, population: i64) {
        self.population.insert(key, population);
    }

    /// Resolve a source-specific identifier to its canonical key
    ///
    /// Pure lookup. `source` is carried only for error context.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownRegion`] when the identifier is unmapped; the
    /// registry never invents a key, callers decide whether to skip or
    /// escalate.
    pub fn resolve(
        &self,
        identifier: &str,
        source: SourceId,
    ) -> Result<RegionKey, RegistryError> {
        self.lookup
            .get(identifier)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownRegion {
                identifier: identifier.to_string(),
                source,
            })
    }

    /// Population estimate for a canonical key, if the table had one
    pub fn population(&self, key: &RegionKey) -> Option<i64> {
        self.population.get(key).copied()
    }

    /// Whether a region is on the permanent exclusion list
    pub fn is_excluded(identifier: &str) -> bool {
        EXCLUDED_REGIONS.contains(&identifier)
    }
}
