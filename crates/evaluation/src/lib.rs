//! Precision/recall evaluation of recommender configurations
//!
//! [`EvaluationRunner`] sweeps a [`SweepGrid`] of algorithms, neighbourhood
//! sizes and recommendation counts. For every configuration it resolves a
//! model through the [`ModelCache`], scores each user's recommendations
//! against held-out interactions and writes per-user and aggregate reports.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod accumulator;
pub mod model_cache;
pub mod precision_recall;
pub mod recommendation_query;
pub mod report;
mod runner;

pub use accumulator::{AggregateMetrics, MetricsAccumulator};
pub use model_cache::ModelCache;
pub use precision_recall::{score, PrecisionRecallResult};
pub use recommendation_query::RecommendationQuery;
pub use report::{ReportWriter, SweepReport, UserReport};
pub use runner::{EvaluationRunner, SweepGrid};
