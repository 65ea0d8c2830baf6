//! Cross-crate integration: engine output through artifact io and back

use chrono::NaiveDate;
use episeries::batch::{EngineConfig, ReconciliationEngine};
use episeries::core::registry::RegionRegistry;
use episeries::core::types::{Metric, RawObservation, RegionKey, SourceId};
use episeries::augment;
use std::sync::atomic::AtomicBool;

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 3, 1).unwrap() + chrono::Duration::days(offset)
}

fn observations_for(region: &str) -> Vec<RawObservation> {
    let cases = [10i64, 20, 15, 30, 42];
    let deaths = [0i64, 1, 1, 2, 2];
    let recover = [1i64, 3, 6, 6, 9];
    let mut observations = Vec::new();
    for (i, ((cases, deaths), recover)) in
        cases.iter().zip(&deaths).zip(&recover).enumerate()
    {
        for (metric, value) in [
            (Metric::Cases, cases),
            (Metric::Deaths, deaths),
            (Metric::Recovered, recover),
        ] {
            observations.push(RawObservation {
                region: region.into(),
                date: day(i as i64),
                metric,
                value: Some(*value),
                source: SourceId::JhuGlobal,
            });
        }
    }
    observations
}

#[test]
fn engine_to_artifact_round_trip() {
    let mut registry = RegionRegistry::new();
    registry.add_country("Italy");
    registry.add_population(RegionKey::new("Italy"), 60_461_826);

    let engine = ReconciliationEngine::new(EngineConfig::default());
    let outcome = engine.run(observations_for("Italy"), &registry, &AtomicBool::new(false));
    assert_eq!(outcome.series.len(), 1);
    assert!(outcome.failures.is_empty());

    // Fold in a late-arriving testing feed with a gap
    let tests_feed = vec![
        (day(0), Some(100)),
        (day(1), None),
        (day(2), None),
        (day(3), Some(400)),
        (day(4), Some(450)),
    ];
    let finalized = augment(&outcome.series[0], Metric::Tests, &tests_feed);
    assert_eq!(
        finalized.new_tests,
        vec![None, None, None, Some(300), Some(50)]
    );

    // Persist and restore through the artifact layer
    let dir = tempfile::tempdir().unwrap();
    let path = episeries::io::write_series(&finalized, dir.path()).unwrap();
    assert!(path.ends_with("covidtimeseries_Italy.csv"));

    let restored = episeries::io::read_series(dir.path(), &finalized.region).unwrap();
    assert_eq!(restored, finalized);
    assert_eq!(restored.population, Some(60_461_826));

    // The artifact honors the monotone postcondition after the round trip
    let reported: Vec<i64> = restored.cum_cases.iter().flatten().copied().collect();
    assert!(reported.windows(2).all(|w| w[1] >= w[0]));
}
