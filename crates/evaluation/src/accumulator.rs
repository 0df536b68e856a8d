//! Running per-configuration metric totals

use receval_core::{Algorithm, Configuration, Error, Result};
use serde::{Deserialize, Serialize};

/// Final metrics of one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub algorithm: Algorithm,
    pub neighbourhood_size: usize,
    pub recommendation_count: usize,
    pub user_count: usize,
    /// Data count below which a user counts as having insufficient data
    pub sufficiency_threshold: usize,
    pub avg_data_count: f64,
    pub min_data_count: usize,
    /// Percentage (0-100) of users below the sufficiency threshold
    pub below_threshold_percent: f64,
    pub avg_precision: f64,
    pub avg_recall: f64,
}

/// Folds per-user results of a single configuration
///
/// A fresh accumulator is created for every configuration and consumed by
/// [`MetricsAccumulator::finalize`].
#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    configuration: Configuration,
    sufficiency_threshold: usize,
    precision_sum: f64,
    recall_sum: f64,
    data_count_sum: usize,
    min_data_count: usize,
    below_threshold: usize,
    users_seen: usize,
}

impl MetricsAccumulator {
    pub fn new(configuration: Configuration, sufficiency_threshold: usize) -> Self {
        Self {
            configuration,
            sufficiency_threshold,
            precision_sum: 0.0,
            recall_sum: 0.0,
            data_count_sum: 0,
            min_data_count: usize::MAX,
            below_threshold: 0,
            users_seen: 0,
        }
    }

    /// Fold one user. Undefined precision must already be folded to zero.
    pub fn add_user(&mut self, precision: f64, recall: f64, data_count: usize) {
        self.precision_sum += precision;
        self.recall_sum += recall;
        self.data_count_sum += data_count;
        self.min_data_count = self.min_data_count.min(data_count);
        if data_count < self.sufficiency_threshold {
            self.below_threshold += 1;
        }
        self.users_seen += 1;
    }

    pub fn users_seen(&self) -> usize {
        self.users_seen
    }

    /// Compute means over `user_count` users
    pub fn finalize(self, user_count: usize) -> Result<AggregateMetrics> {
        if user_count == 0 {
            return Err(Error::invariant(format!(
                "no users to aggregate for {}",
                self.configuration
            )));
        }
        if user_count != self.users_seen {
            return Err(Error::invariant(format!(
                "aggregating over {user_count} users but {} were folded",
                self.users_seen
            )));
        }

        let users = user_count as f64;
        Ok(AggregateMetrics {
            algorithm: self.configuration.algorithm(),
            neighbourhood_size: self.configuration.neighbourhood_size(),
            recommendation_count: self.configuration.recommendation_count(),
            user_count,
            sufficiency_threshold: self.sufficiency_threshold,
            avg_data_count: self.data_count_sum as f64 / users,
            min_data_count: self.min_data_count,
            below_threshold_percent: self.below_threshold as f64 / users * 100.0,
            avg_precision: self.precision_sum / users,
            avg_recall: self.recall_sum / users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configuration() -> Configuration {
        Configuration::new(Algorithm::ItemCf, 10, 5).unwrap()
    }

    #[test]
    fn test_finalize_computes_means() {
        let mut acc = MetricsAccumulator::new(configuration(), 20);
        acc.add_user(1.0, 0.5, 10);
        acc.add_user(0.0, 0.25, 30);
        acc.add_user(0.5, 0.0, 50);

        let metrics = acc.finalize(3).unwrap();
        assert_eq!(metrics.algorithm, Algorithm::ItemCf);
        assert_eq!(metrics.neighbourhood_size, 10);
        assert_eq!(metrics.recommendation_count, 5);
        assert_eq!(metrics.user_count, 3);
        assert_eq!(metrics.min_data_count, 10);
        assert!((metrics.avg_data_count - 30.0).abs() < 1e-9);
        assert!((metrics.below_threshold_percent - 100.0 / 3.0).abs() < 1e-9);
        assert!((metrics.avg_precision - 0.5).abs() < 1e-9);
        assert!((metrics.avg_recall - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut acc = MetricsAccumulator::new(configuration(), 20);
        acc.add_user(0.0, 0.0, 20);
        acc.add_user(0.0, 0.0, 19);
        let metrics = acc.finalize(2).unwrap();
        assert!((metrics.below_threshold_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_finalize_with_zero_users_fails() {
        let acc = MetricsAccumulator::new(configuration(), 20);
        assert!(matches!(
            acc.finalize(0),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_finalize_rejects_mismatched_count() {
        let mut acc = MetricsAccumulator::new(configuration(), 20);
        acc.add_user(1.0, 1.0, 5);
        assert_eq!(acc.users_seen(), 1);
        assert!(acc.finalize(2).is_err());
    }
}
