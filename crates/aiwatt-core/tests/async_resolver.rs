//! Estimates backed by an asynchronous grid intensity resolver.

use aiwatt_core::{
    Estimator, ImpactInputs, IntensitySource, NumericRange, ResolverQuery, UncertaintyRanges,
};
use approx::assert_relative_eq;
use std::cell::Cell;

fn inputs() -> ImpactInputs {
    ImpactInputs::new(400.0)
        .with_region("Deutschland")
        .with_timestamp("2024-06-01T12:00:00Z")
        .with_processing_time(9.0)
}

#[tokio::test]
async fn test_resolver_answer_is_used() {
    let calls = Cell::new(0);
    let seen = Cell::new(None);
    let resolver = |query: ResolverQuery| {
        calls.set(calls.get() + 1);
        seen.set(Some(query.clone()));
        async move {
            match query.region.as_deref() {
                Some("de") => Some(250.0),
                _ => None,
            }
        }
    };

    let result = Estimator::new()
        .estimate_impact_async(&inputs(), &resolver)
        .await
        .unwrap();

    assert_eq!(calls.get(), 1);
    let query = seen.take().unwrap();
    assert_eq!(query.region.as_deref(), Some("de"));
    assert_eq!(query.timestamp.as_deref(), Some("2024-06-01T12:00:00Z"));
    assert_eq!(result.grid_intensity_source, IntensitySource::Resolver);
    assert_relative_eq!(result.co2_grams, result.energy_kwh * 250.0);
}

#[tokio::test]
async fn test_invalid_answer_falls_back_to_dataset() {
    for answer in [Some(0.0), Some(-10.0), Some(f64::NAN), None] {
        let resolver = move |_: ResolverQuery| async move { answer };
        let result = Estimator::new()
            .estimate_impact_async(&inputs(), &resolver)
            .await
            .unwrap();

        assert_eq!(
            result.grid_intensity_source,
            IntensitySource::Region {
                code: "de".to_string()
            },
            "answer {answer:?}"
        );
        assert!(!result.has_warnings());
        assert_eq!(result.diagnostics.is_empty(), answer.is_none());
    }
}

#[tokio::test]
async fn test_explicit_intensity_skips_resolver() {
    let calls = Cell::new(0);
    let resolver = |_: ResolverQuery| {
        calls.set(calls.get() + 1);
        async { Some(999.0) }
    };

    let result = Estimator::new()
        .estimate_impact_async(&inputs().with_grid_intensity(42.0), &resolver)
        .await
        .unwrap();

    assert_eq!(calls.get(), 0);
    assert_eq!(result.grid_intensity_source, IntensitySource::Explicit);
    assert_relative_eq!(result.grid_carbon_intensity_g_per_kwh, 42.0);
}

#[tokio::test]
async fn test_range_awaits_resolver_once() {
    let calls = Cell::new(0);
    let resolver = |_: ResolverQuery| {
        calls.set(calls.get() + 1);
        async { Some(100.0) }
    };
    let ranges = UncertaintyRanges {
        gpu_power_w: Some(NumericRange::new(300.0, 500.0)),
        ..Default::default()
    };

    let result = Estimator::new()
        .estimate_impact_range_async(&inputs(), &ranges, &resolver)
        .await
        .unwrap();

    assert_eq!(calls.get(), 1);
    assert_relative_eq!(result.co2_grams_min, result.energy_kwh_min * 100.0);
    assert_relative_eq!(result.co2_grams_max, result.energy_kwh_max * 100.0);
}
