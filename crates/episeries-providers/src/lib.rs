//! Source adapter integrations
//!
//! One adapter per upstream feed, each reducing its source's quirks (date
//! formats, column naming, state-vs-country granularity) to the shared
//! [`RawObservation`] vocabulary. The repair/derive pipeline never sees a
//! source-specific shape: adding a source means adding an adapter module
//! here, nothing else.
//!
//! ## Supported sources
//!
//! - `jhu` - Johns Hopkins CSSE global time series (cases, deaths, recoveries)
//! - `covidtracking` - The COVID Tracking Project archived US recovery data
//! - `owid` - Our World In Data testing and vaccination feeds
//! - `opencovid` - OpenCOVID Canada provincial API
//!
//! ## Adding a new source
//!
//! Follow the established pattern:
//!
//! ```text
//! providers/
//! └── [source_name]/
//!     ├── mod.rs        # Adapter struct and SourceAdapter impl
//!     └── parse.rs      # Pure text -> RawObservation parsing (testable offline)
//! ```
//!
//! ## Design principles
//!
//! 1. **Adapter pattern**: convert source format -> RawObservation, nothing more
//! 2. **Pure parsing**: network I/O and parsing are separate; parsers run offline
//! 3. **Registry-resolved regions**: adapters never invent canonical keys
//! 4. **Skip, don't guess**: unresolvable identifiers are logged and dropped

pub mod covidtracking;
pub mod http;
pub mod jhu;
pub mod opencovid;
pub mod owid;

use async_trait::async_trait;
use episeries_core::registry::RegionRegistry;
use episeries_core::types::{RawObservation, SourceId};

pub use covidtracking::CovidTrackingArchive;
pub use http::{FetchError, RetryPolicy};
pub use jhu::JhuGlobalSource;
pub use opencovid::OpenCovidSource;
pub use owid::{OwidTestingSource, OwidVaccinationsSource};

/// Capability shared by every source adapter
///
/// `fetch_raw` returns observations already reduced to the canonical metric
/// vocabulary, with regions resolved through the registry. Implementations
/// retry transient failures internally per their [`RetryPolicy`]; a source
/// that stays unreachable escalates [`FetchError::RetriesExhausted`] and the
/// caller excludes the affected regions from the run.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Identity stamped on every observation this adapter emits
    fn source(&self) -> SourceId;

    /// Fetch and normalize the source's full raw feed
    async fn fetch_raw(
        &self,
        registry: &RegionRegistry,
    ) -> Result<Vec<RawObservation>, FetchError>;
}
