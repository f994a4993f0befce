//! Totals over many estimates.

use crate::result::ImpactResult;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Summed energy and CO2 of a set of estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateImpactResult {
    pub count: usize,
    /// unit: kWh
    pub energy_kwh: FloatValue,
    /// unit: g
    pub co2_grams: FloatValue,
}

impl AggregateImpactResult {
    pub fn add(&mut self, result: &ImpactResult) {
        self.count += 1;
        self.energy_kwh += result.energy_kwh;
        self.co2_grams += result.co2_grams;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl<'a> Extend<&'a ImpactResult> for AggregateImpactResult {
    fn extend<T: IntoIterator<Item = &'a ImpactResult>>(&mut self, iter: T) {
        iter.into_iter().for_each(|result| self.add(result));
    }
}

impl<'a> FromIterator<&'a ImpactResult> for AggregateImpactResult {
    fn from_iter<T: IntoIterator<Item = &'a ImpactResult>>(iter: T) -> Self {
        let mut total = Self::default();
        total.extend(iter);
        total
    }
}

/// Sum a slice of estimates. An empty slice gives zero totals.
pub fn aggregate_impacts(results: &[ImpactResult]) -> AggregateImpactResult {
    results.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::estimate_impact;
    use crate::inputs::ImpactInputs;
    use is_close::is_close;

    fn result(gpu_power_w: FloatValue, seconds: FloatValue, region: &str) -> ImpactResult {
        estimate_impact(
            &ImpactInputs::new(gpu_power_w)
                .with_region(region)
                .with_processing_time(seconds),
        )
        .unwrap()
    }

    #[test]
    fn test_empty() {
        let total = aggregate_impacts(&[]);
        assert_eq!(total, AggregateImpactResult::default());
        assert!(total.is_empty());
        assert_eq!(total.energy_kwh, 0.0);
        assert_eq!(total.co2_grams, 0.0);
    }

    #[test]
    fn test_sums() {
        let results = vec![
            result(350.0, 12.0, "eu"),
            result(100.0, 10.0, "no"),
            result(700.0, 3.0, "us"),
        ];
        let total = aggregate_impacts(&results);

        assert_eq!(total.count, 3);
        assert!(is_close!(
            total.energy_kwh,
            results.iter().map(|r| r.energy_kwh).sum::<FloatValue>()
        ));
        assert!(is_close!(
            total.co2_grams,
            results.iter().map(|r| r.co2_grams).sum::<FloatValue>()
        ));
    }

    #[test]
    fn test_order_independent() {
        let mut results = vec![
            result(350.0, 12.0, "eu"),
            result(100.0, 10.0, "no"),
            result(700.0, 3.0, "us"),
        ];
        let forward = aggregate_impacts(&results);
        results.reverse();
        let backward = aggregate_impacts(&results);

        assert_eq!(forward.count, backward.count);
        assert!(is_close!(forward.energy_kwh, backward.energy_kwh));
        assert!(is_close!(forward.co2_grams, backward.co2_grams));
    }

    #[test]
    fn test_extend_matches_collect() {
        let results = [result(350.0, 12.0, "eu"), result(100.0, 10.0, "no")];
        let mut running = AggregateImpactResult::default();
        running.add(&results[0]);
        running.extend(&results[1..]);

        let collected: AggregateImpactResult = results.iter().collect();
        assert_eq!(running, collected);
    }
}
