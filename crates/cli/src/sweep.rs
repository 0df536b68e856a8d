//! Wiring of the store, trainer and runner for one sweep

use crate::selection::SweepSelection;
use anyhow::{Context, Result};
use receval_core::Config;
use receval_evaluation::{EvaluationRunner, SweepGrid, SweepReport};
use receval_models::NeighbourhoodTrainer;
use receval_storage::InteractionStore;
use std::sync::Arc;
use tracing::info;

/// Build the grid for a selection, rejecting it before any work starts
pub fn build_grid(selection: &SweepSelection) -> Result<SweepGrid> {
    SweepGrid::new(
        &selection.algorithms,
        &selection.neighbourhood_sizes,
        &selection.recommendation_counts,
    )
    .context("Invalid sweep selection")
}

/// Run the whole sweep against `store`, closing it once afterwards
///
/// The store is closed whether the sweep succeeds or not.
pub async fn run_sweep(
    config: &Config,
    grid: &SweepGrid,
    store: Arc<dyn InteractionStore>,
) -> Result<SweepReport> {
    let trainer = Arc::new(NeighbourhoodTrainer::new(Arc::clone(&store)));
    let mut runner = EvaluationRunner::new(Arc::clone(&store), trainer, &config.evaluation);

    info!(
        configurations = grid.len(),
        output_dir = %config.evaluation.output_dir,
        model_dir = %config.evaluation.model_dir,
        "Running evaluation sweep"
    );
    let outcome = runner.run(grid).await;
    store.close().await;

    outcome.context("Evaluation sweep aborted")
}
