//! Per-user, per-configuration and sweep reports

use crate::accumulator::AggregateMetrics;
use crate::precision_recall::PrecisionRecallResult;
use receval_core::{Configuration, Error, ItemId, Result, ResultExt, UserId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the sweep summary written at the output root
pub const SUMMARY_FILE_NAME: &str = "summary.json";

/// Name of the per-configuration aggregate report
pub const AGGREGATE_FILE_NAME: &str = "average.dat";

/// Everything reported for one user under one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReport {
    pub user: UserId,
    pub result: PrecisionRecallResult,
    pub data_count: usize,
    pub recommendations: Vec<ItemId>,
}

/// Writes the report tree rooted at the output directory
///
/// ```text
/// <output_dir>/<algorithm>/neighbours<N>top<K>/<user>.dat
/// <output_dir>/<algorithm>/neighbours<N>top<K>/average.dat
/// <output_dir>/summary.json
/// ```
///
/// Existing files are overwritten.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory holding every report of one configuration
    pub fn config_dir(&self, configuration: &Configuration) -> PathBuf {
        self.output_dir
            .join(configuration.algorithm().to_string())
            .join(format!(
                "neighbours{}top{}",
                configuration.neighbourhood_size(),
                configuration.recommendation_count()
            ))
    }

    pub fn user_report_path(&self, configuration: &Configuration, user: UserId) -> PathBuf {
        self.config_dir(configuration).join(format!("{user}.dat"))
    }

    pub fn aggregate_report_path(&self, configuration: &Configuration) -> PathBuf {
        self.config_dir(configuration).join(AGGREGATE_FILE_NAME)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(SUMMARY_FILE_NAME)
    }

    /// Create the configuration directory if it does not exist yet
    pub fn prepare(&self, configuration: &Configuration) -> Result<PathBuf> {
        let dir = self.config_dir(configuration);
        std::fs::create_dir_all(&dir)
            .context(format!("Failed to create report directory {}", dir.display()))?;
        Ok(dir)
    }

    pub fn write_user(&self, configuration: &Configuration, report: &UserReport) -> Result<()> {
        let path = self.user_report_path(configuration, report.user);
        write_file(&path, &format_user_report(report))
    }

    pub fn write_aggregate(
        &self,
        configuration: &Configuration,
        metrics: &AggregateMetrics,
    ) -> Result<()> {
        let path = self.aggregate_report_path(configuration);
        write_file(&path, &format_aggregate_report(metrics))
    }

    /// Write the sweep summary as pretty JSON, returning its path
    pub fn write_summary(&self, report: &SweepReport) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create output directory {}",
            self.output_dir.display()
        ))?;
        let path = self.summary_path();
        let json = report
            .to_json()
            .map_err(|e| Error::report(format!("Failed to serialize sweep summary: {e}")))?;
        write_file(&path, &json)?;
        Ok(path)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).context(format!("Failed to write {}", path.display()))
}

/// Floats are written with a decimal point and undefined values as `NaN`
fn format_float(value: f64) -> String {
    format!("{value:?}")
}

pub fn format_user_report(report: &UserReport) -> String {
    let precision = report.result.precision.unwrap_or(f64::NAN);
    let recommendations: String = report
        .recommendations
        .iter()
        .map(|item| format!("{item}\n"))
        .collect();
    format!(
        "User Id: {}\nPrecision: {}\nRecall: {}\nData Pieces: {}\nRecommendations:\n{recommendations}",
        report.user,
        format_float(precision),
        format_float(report.result.recall),
        report.data_count,
    )
}

pub fn format_aggregate_report(metrics: &AggregateMetrics) -> String {
    format!(
        "Neighbourhood Size: {}\n\
         Total Recommendations: {}\n\
         Avg. Data Pieces Per User: {}\n\
         Min Data Pieces For A User: {}\n\
         Users With Less Than {} Pieces Of Data: {}%\n\
         Avg. Precision: {}\n\
         Avg. Recall: {}\n",
        metrics.neighbourhood_size,
        metrics.recommendation_count,
        format_float(metrics.avg_data_count),
        metrics.min_data_count,
        metrics.sufficiency_threshold,
        format_float(metrics.below_threshold_percent),
        format_float(metrics.avg_precision),
        format_float(metrics.avg_recall),
    )
}

/// Aggregates of every configuration a sweep completed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepReport {
    pub configurations: Vec<AggregateMetrics>,
    /// Wall-clock time of the sweep in seconds
    pub duration_secs: f64,
}

impl SweepReport {
    /// Best configuration by average precision
    pub fn best_by_precision(&self) -> Option<&AggregateMetrics> {
        self.configurations
            .iter()
            .max_by(|a, b| a.avg_precision.total_cmp(&b.avg_precision))
    }

    /// Best configuration by average recall
    pub fn best_by_recall(&self) -> Option<&AggregateMetrics> {
        self.configurations
            .iter()
            .max_by(|a, b| a.avg_recall.total_cmp(&b.avg_recall))
    }

    /// Print the sweep as a table to stdout
    pub fn print_summary(&self) {
        println!();
        println!("{}", "=".repeat(80));
        println!("RECOMMENDER EVALUATION SWEEP");
        println!("{}", "=".repeat(80));

        println!(
            "\n{:<14} {:>10} {:>6} {:>8} {:>10} {:>10} {:>10}",
            "Algorithm", "Neighbours", "Top", "Users", "Low Data", "Precision", "Recall"
        );
        println!("{:-<80}", "");

        for m in &self.configurations {
            println!(
                "{:<14} {:>10} {:>6} {:>8} {:>9.1}% {:>9.2}% {:>9.2}%",
                m.algorithm.to_string(),
                m.neighbourhood_size,
                m.recommendation_count,
                m.user_count,
                m.below_threshold_percent,
                m.avg_precision * 100.0,
                m.avg_recall * 100.0
            );
        }
        println!("{:-<80}", "");

        if let Some(best) = self.best_by_precision() {
            println!(
                "Best precision: {} with {} neighbours, top {} ({:.2}%)",
                best.algorithm,
                best.neighbourhood_size,
                best.recommendation_count,
                best.avg_precision * 100.0
            );
        }
        if let Some(best) = self.best_by_recall() {
            println!(
                "Best recall: {} with {} neighbours, top {} ({:.2}%)",
                best.algorithm,
                best.neighbourhood_size,
                best.recommendation_count,
                best.avg_recall * 100.0
            );
        }
        println!("Duration: {:.2}s", self.duration_secs);
        println!("{}", "=".repeat(80));
    }

    /// Serialize the report to JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use receval_core::Algorithm;

    fn configuration() -> Configuration {
        Configuration::new(Algorithm::ItemCf, 10, 5).unwrap()
    }

    fn metrics(algorithm: Algorithm, precision: f64, recall: f64) -> AggregateMetrics {
        AggregateMetrics {
            algorithm,
            neighbourhood_size: 10,
            recommendation_count: 5,
            user_count: 4,
            sufficiency_threshold: 20,
            avg_data_count: 25.5,
            min_data_count: 3,
            below_threshold_percent: 25.0,
            avg_precision: precision,
            avg_recall: recall,
        }
    }

    #[test]
    fn test_paths_are_deterministic_and_distinct() {
        let writer = ReportWriter::new("metrics");
        let configuration = configuration();

        let user = writer.user_report_path(&configuration, 42);
        let aggregate = writer.aggregate_report_path(&configuration);
        assert_eq!(user, PathBuf::from("metrics/itemcf/neighbours10top5/42.dat"));
        assert_eq!(
            aggregate,
            PathBuf::from("metrics/itemcf/neighbours10top5/average.dat")
        );
        assert_ne!(user, aggregate);
        assert_eq!(user, writer.user_report_path(&configuration, 42));
    }

    #[test]
    fn test_user_report_format() {
        let report = UserReport {
            user: 7,
            result: PrecisionRecallResult {
                precision: Some(0.5),
                recall: 1.0,
            },
            data_count: 12,
            recommendations: vec![9, 4],
        };
        assert_eq!(
            format_user_report(&report),
            "User Id: 7\nPrecision: 0.5\nRecall: 1.0\nData Pieces: 12\nRecommendations:\n9\n4\n"
        );
    }

    #[test]
    fn test_undefined_precision_is_written_as_nan() {
        let report = UserReport {
            user: 7,
            result: PrecisionRecallResult {
                precision: None,
                recall: 0.0,
            },
            data_count: 0,
            recommendations: Vec::new(),
        };
        let text = format_user_report(&report);
        assert!(text.contains("Precision: NaN\n"));
        assert!(text.ends_with("Recommendations:\n"));
    }

    #[test]
    fn test_aggregate_report_format() {
        let text = format_aggregate_report(&metrics(Algorithm::ItemCf, 0.25, 0.5));
        assert_eq!(
            text,
            "Neighbourhood Size: 10\n\
             Total Recommendations: 5\n\
             Avg. Data Pieces Per User: 25.5\n\
             Min Data Pieces For A User: 3\n\
             Users With Less Than 20 Pieces Of Data: 25.0%\n\
             Avg. Precision: 0.25\n\
             Avg. Recall: 0.5\n"
        );
    }

    #[test]
    fn test_writes_overwrite_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let configuration = configuration();
        writer.prepare(&configuration).unwrap();

        let path = writer.user_report_path(&configuration, 1);
        std::fs::write(&path, "old contents that are longer than the report").unwrap();

        let report = UserReport {
            user: 1,
            result: PrecisionRecallResult {
                precision: Some(1.0),
                recall: 1.0,
            },
            data_count: 1,
            recommendations: vec![3],
        };
        writer.write_user(&configuration, &report).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format_user_report(&report)
        );
    }

    #[test]
    fn test_write_fails_without_prepared_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let aggregate = metrics(Algorithm::ItemCf, 0.1, 0.1);
        let result = writer.write_aggregate(&configuration(), &aggregate);
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_round_trip_and_best() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("out"));
        let report = SweepReport {
            configurations: vec![
                metrics(Algorithm::ItemCf, 0.2, 0.6),
                metrics(Algorithm::UserCf, 0.4, 0.3),
            ],
            duration_secs: 1.5,
        };

        assert_eq!(
            report.best_by_precision().map(|m| m.algorithm),
            Some(Algorithm::UserCf)
        );
        assert_eq!(
            report.best_by_recall().map(|m| m.algorithm),
            Some(Algorithm::ItemCf)
        );

        let path = writer.write_summary(&report).unwrap();
        assert_eq!(path, dir.path().join("out").join(SUMMARY_FILE_NAME));
        let parsed: SweepReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.configurations, report.configurations);
    }
}
