//! Artifact and static-table I/O
//!
//! Reads and writes the canonical per-region CSV artifacts and loads the
//! static lookup tables (population estimates, ISO alpha-3 codes) that feed
//! the region registry. The artifact schema is the external contract:
//! consumers locate a region's artifact from its canonical key alone and
//! read one row per calendar day with `-1` standing for "not reported".

pub mod artifact;
pub mod tables;

pub use artifact::{artifact_file_name, artifact_path, read_series, write_series, ArtifactError};
pub use tables::{load_iso_table, load_population_table, registry_from_tables, TableError};
