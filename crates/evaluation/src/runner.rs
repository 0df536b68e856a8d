//! Grid sweep over algorithms, neighbourhood sizes and recommendation counts

use crate::accumulator::{AggregateMetrics, MetricsAccumulator};
use crate::model_cache::ModelCache;
use crate::precision_recall::score;
use crate::recommendation_query::RecommendationQuery;
use crate::report::{ReportWriter, SweepReport, UserReport};
use indicatif::{ProgressBar, ProgressStyle};
use receval_core::{Algorithm, Configuration, Error, EvaluationConfig, ModelTrainer, Result};
use receval_storage::InteractionStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The cross product of the operator's selections
///
/// Configurations are ordered algorithm first, then neighbourhood size, then
/// recommendation count, preserving the order each list was given in.
#[derive(Debug, Clone)]
pub struct SweepGrid {
    configurations: Vec<Configuration>,
}

impl SweepGrid {
    /// Build the grid, rejecting empty dimensions and zero sizes or counts
    pub fn new(
        algorithms: &[Algorithm],
        neighbourhood_sizes: &[usize],
        recommendation_counts: &[usize],
    ) -> Result<Self> {
        if algorithms.is_empty() {
            return Err(Error::invalid_input("at least one algorithm is required"));
        }
        if neighbourhood_sizes.is_empty() {
            return Err(Error::invalid_input(
                "at least one neighbourhood size is required",
            ));
        }
        if recommendation_counts.is_empty() {
            return Err(Error::invalid_input(
                "at least one recommendation count is required",
            ));
        }

        let mut configurations = Vec::with_capacity(
            algorithms.len() * neighbourhood_sizes.len() * recommendation_counts.len(),
        );
        for &algorithm in algorithms {
            for &size in neighbourhood_sizes {
                for &count in recommendation_counts {
                    configurations.push(Configuration::new(algorithm, size, count)?);
                }
            }
        }
        Ok(Self { configurations })
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }
}

/// Runs every configuration of a grid against every user in the store
///
/// Work is strictly sequential. The first storage, model or invariant error
/// aborts the sweep; reports of configurations finished before it remain on
/// disk.
pub struct EvaluationRunner {
    store: Arc<dyn InteractionStore>,
    cache: ModelCache,
    writer: ReportWriter,
    sufficiency_threshold: usize,
    show_progress: bool,
}

impl EvaluationRunner {
    pub fn new(
        store: Arc<dyn InteractionStore>,
        trainer: Arc<dyn ModelTrainer>,
        config: &EvaluationConfig,
    ) -> Self {
        Self {
            store,
            cache: ModelCache::new(&config.model_dir, trainer),
            writer: ReportWriter::new(&config.output_dir),
            sufficiency_threshold: config.sufficiency_threshold,
            show_progress: config.show_progress,
        }
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    pub fn writer(&self) -> &ReportWriter {
        &self.writer
    }

    /// Evaluate every configuration of `grid` in order
    pub async fn run(&mut self, grid: &SweepGrid) -> Result<SweepReport> {
        let started = Instant::now();
        let total = grid.len();
        let mut report = SweepReport::default();

        info!("Starting sweep of {total} configurations");
        for (index, configuration) in grid.configurations().iter().enumerate() {
            let position = index + 1;
            info!("----STARTING {position}/{total}: {configuration}----");

            let metrics = self
                .evaluate(configuration)
                .await
                .inspect_err(|e| error!("Configuration {configuration} failed: {e}"))?;
            report.configurations.push(metrics);

            info!("----FINISHED {position}/{total}: {configuration}----");
        }

        report.duration_secs = started.elapsed().as_secs_f64();
        let summary = self.writer.write_summary(&report)?;
        info!(
            path = %summary.display(),
            builds = self.cache.builds_triggered(),
            "Sweep complete"
        );
        Ok(report)
    }

    async fn evaluate(&mut self, configuration: &Configuration) -> Result<AggregateMetrics> {
        let model = self.cache.resolve(configuration).await?;
        let query = RecommendationQuery::new(model);
        let count = configuration.recommendation_count();

        let users = self.store.list_users().await?;
        debug!(users = users.len(), "Fetched user snapshot");
        self.writer.prepare(configuration)?;

        let mut accumulator = MetricsAccumulator::new(*configuration, self.sufficiency_threshold);
        let pb = create_progress_bar(users.len(), self.show_progress);
        for &user in &users {
            let recommendations = query.recommend(user, count)?;
            let ground_truth = self.store.ground_truth(user).await?;
            let data_count = self.store.data_count(user).await?;

            let result = score(&recommendations, &ground_truth)
                .inspect_err(|_| error!(user, "User has no ground truth"))?;
            self.writer.write_user(
                configuration,
                &UserReport {
                    user,
                    result,
                    data_count,
                    recommendations,
                },
            )?;
            accumulator.add_user(result.precision_or_zero(), result.recall, data_count);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let metrics = accumulator.finalize(users.len())?;
        self.writer.write_aggregate(configuration, &metrics)?;
        info!(
            precision = metrics.avg_precision,
            recall = metrics.avg_recall,
            "Aggregated {} users",
            metrics.user_count
        );
        Ok(metrics)
    }
}

fn create_progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} users {msg}")
            .map_err(|e| error!("Failed to set progress bar style: {}", e))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_order_is_nested() {
        let grid = SweepGrid::new(
            &[Algorithm::UserCf, Algorithm::ItemCf],
            &[10, 5],
            &[1, 2],
        )
        .unwrap();
        assert_eq!(grid.len(), 8);

        let order: Vec<(Algorithm, usize, usize)> = grid
            .configurations()
            .iter()
            .map(|c| {
                (
                    c.algorithm(),
                    c.neighbourhood_size(),
                    c.recommendation_count(),
                )
            })
            .collect();
        assert_eq!(order[0], (Algorithm::UserCf, 10, 1));
        assert_eq!(order[1], (Algorithm::UserCf, 10, 2));
        assert_eq!(order[2], (Algorithm::UserCf, 5, 1));
        assert_eq!(order[4], (Algorithm::ItemCf, 10, 1));
        assert_eq!(order[7], (Algorithm::ItemCf, 5, 2));
    }

    #[test]
    fn test_grid_rejects_empty_dimensions() {
        assert!(SweepGrid::new(&[], &[10], &[5]).is_err());
        assert!(SweepGrid::new(&[Algorithm::ItemCf], &[], &[5]).is_err());
        assert!(SweepGrid::new(&[Algorithm::ItemCf], &[10], &[]).is_err());
    }

    #[test]
    fn test_grid_rejects_zero_values() {
        assert!(matches!(
            SweepGrid::new(&[Algorithm::ItemCf], &[0], &[5]),
            Err(Error::InvalidInput(_))
        ));
        assert!(SweepGrid::new(&[Algorithm::ItemCf], &[10], &[0]).is_err());
    }
}
