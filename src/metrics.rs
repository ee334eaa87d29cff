use std::{collections::BTreeMap, path::Path};

use serde::Serialize;
use tracing::info;

use crate::{
    error::{AnalysisError, Result},
    record::ResultRecord,
    visuals,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    // Sample standard deviation; undefined for a single value.
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub gap_stats: GapStats,
    pub runtime_by_size: BTreeMap<u64, f64>,
    pub feasibility_rate: f64,
}

/// Summarizes the records and, when `plot_path` is set and some record has
/// an iteration trace, renders the convergence chart there.
pub fn analyze(records: &[ResultRecord], plot_path: Option<&Path>) -> Result<MetricsSummary> {
    let summary = summarize(records)?;

    if let Some(plot_path) = plot_path {
        if records.iter().any(|record| record.trace().is_some()) {
            visuals::plot_convergence(records, plot_path)?;
        }
    }

    Ok(summary)
}

pub fn summarize(records: &[ResultRecord]) -> Result<MetricsSummary> {
    if records.is_empty() {
        return Err(AnalysisError::NoResults);
    }

    let gaps: Vec<f64> = records.iter().filter_map(|record| record.gap_percent).collect();
    let gap_stats = gap_stats(&gaps).ok_or(AnalysisError::MissingField("GapPercent"))?;

    let runtime_by_size = runtime_by_size(records);
    if runtime_by_size.is_empty() {
        return Err(AnalysisError::MissingField("NumNodes"));
    }

    if records.iter().all(|record| record.value.is_none()) {
        return Err(AnalysisError::MissingField("Value"));
    }
    let feasible = records.iter().filter(|record| record.is_feasible()).count();
    let feasibility_rate = feasible as f64 / records.len() as f64;

    info!(
        records = records.len(),
        feasible,
        mean_gap = gap_stats.mean,
        "computed metrics"
    );

    Ok(MetricsSummary {
        gap_stats,
        runtime_by_size,
        feasibility_rate,
    })
}

pub fn gap_stats(values: &[f64]) -> Option<GapStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = mean(&sorted);
    Some(GapStats {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        median: median(&sorted),
        std: sample_std(&sorted, mean),
    })
}

// Records without a node count are left out, like NaN keys in a group-by.
pub fn runtime_by_size(records: &[ResultRecord]) -> BTreeMap<u64, f64> {
    let mut groups: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let Some(num_nodes) = record.num_nodes {
            groups
                .entry(num_nodes)
                .or_insert_with(Vec::new)
                .push(record.runtime_seconds.seconds());
        }
    }

    groups
        .into_iter()
        .map(|(num_nodes, runtimes)| (num_nodes, mean(&runtimes)))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

// `sorted` must be non-empty and in ascending order.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    Some((squares / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Outcome, RuntimeSeconds, TracePoint};
    use quickcheck_macros::quickcheck;

    fn record(num_nodes: u64, runtime: f64, gap: f64, value: Outcome) -> ResultRecord {
        ResultRecord {
            num_nodes: Some(num_nodes),
            value: Some(value),
            gap_percent: Some(gap),
            iteration_log: None,
            solver: Some("GRASP".to_string()),
            runtime: None,
            runtime_seconds: RuntimeSeconds::Parsed(runtime),
            graph_name: format!("G{}", num_nodes),
        }
    }

    #[test]
    fn two_file_scenario() {
        let records = vec![
            record(10, 90.5, 2.0, Outcome::Feasible(100.0)),
            record(10, 45.0, 4.0, Outcome::Infeasible),
        ];
        let summary = summarize(&records).unwrap();
        assert_eq!(summary.gap_stats.mean, 3.0);
        assert_eq!(summary.gap_stats.min, 2.0);
        assert_eq!(summary.gap_stats.max, 4.0);
        assert_eq!(summary.gap_stats.median, 3.0);
        assert!((summary.gap_stats.std.unwrap() - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(summary.runtime_by_size[&10], 67.75);
        assert_eq!(summary.feasibility_rate, 0.5);
    }

    #[test]
    fn runtime_is_grouped_by_size() {
        let records = vec![
            record(10, 1.0, 0.0, Outcome::Feasible(1.0)),
            record(20, 100.0, 0.0, Outcome::Feasible(1.0)),
            record(10, 3.0, 0.0, Outcome::Feasible(1.0)),
        ];
        let runtimes = runtime_by_size(&records);
        assert_eq!(runtimes.len(), 2);
        assert_eq!(runtimes[&10], 2.0);
        assert_eq!(runtimes[&20], 100.0);
    }

    #[test]
    fn defaulted_runtimes_count_as_zero() {
        let mut malformed = record(10, 0.0, 1.0, Outcome::Feasible(1.0));
        malformed.runtime_seconds = RuntimeSeconds::Malformed("??".to_string());
        let records = vec![malformed, record(10, 8.0, 1.0, Outcome::Feasible(1.0))];
        assert_eq!(runtime_by_size(&records)[&10], 4.0);
    }

    #[test]
    fn median_of_odd_and_even_counts() {
        assert_eq!(gap_stats(&[5.0, 1.0, 3.0]).unwrap().median, 3.0);
        assert_eq!(gap_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap().median, 2.5);
    }

    #[test]
    fn single_gap_has_no_std() {
        let stats = gap_stats(&[1.5]).unwrap();
        assert_eq!(stats.min, 1.5);
        assert_eq!(stats.max, 1.5);
        assert_eq!(stats.std, None);
    }

    #[test]
    fn records_without_a_field_are_skipped() {
        let mut partial = record(30, 5.0, 0.0, Outcome::Feasible(1.0));
        partial.gap_percent = None;
        partial.num_nodes = None;
        partial.value = None;
        let records = vec![partial, record(10, 2.0, 6.0, Outcome::Feasible(1.0))];

        let summary = summarize(&records).unwrap();
        assert_eq!(summary.gap_stats.mean, 6.0);
        assert_eq!(summary.runtime_by_size.len(), 1);
        // Counted in the denominator only.
        assert_eq!(summary.feasibility_rate, 0.5);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(summarize(&[]), Err(AnalysisError::NoResults)));
    }

    #[test]
    fn field_missing_everywhere_is_an_error() {
        let mut no_gap = record(10, 1.0, 0.0, Outcome::Feasible(1.0));
        no_gap.gap_percent = None;
        assert!(matches!(
            summarize(&[no_gap]),
            Err(AnalysisError::MissingField("GapPercent"))
        ));

        let mut no_size = record(10, 1.0, 0.0, Outcome::Feasible(1.0));
        no_size.num_nodes = None;
        assert!(matches!(
            summarize(&[no_size]),
            Err(AnalysisError::MissingField("NumNodes"))
        ));

        let mut no_value = record(10, 1.0, 0.0, Outcome::Feasible(1.0));
        no_value.value = None;
        assert!(matches!(
            summarize(&[no_value]),
            Err(AnalysisError::MissingField("Value"))
        ));
    }

    #[test]
    fn analyze_without_traces_skips_the_plot() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let plot_path = temp_dir.path().join("convergence.png");
        let records = vec![record(10, 1.0, 1.0, Outcome::Feasible(1.0))];

        let summary = analyze(&records, Some(&plot_path)).unwrap();
        assert_eq!(summary, summarize(&records).unwrap());
        assert!(!plot_path.exists());
    }

    #[test]
    fn analyze_with_plot_disabled_only_summarizes() {
        let mut traced = record(10, 1.0, 1.0, Outcome::Feasible(1.0));
        traced.iteration_log = Some(vec![TracePoint { iteration: 0, value: 3.0 }]);
        let records = vec![traced];

        assert_eq!(analyze(&records, None).unwrap(), summarize(&records).unwrap());
    }

    #[quickcheck]
    fn gap_stats_bound_the_mean(values: Vec<i16>) -> bool {
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        match gap_stats(&values) {
            None => values.is_empty(),
            Some(stats) => {
                let expected = values.iter().sum::<f64>() / values.len() as f64;
                stats.min <= stats.median
                    && stats.median <= stats.max
                    && (stats.mean - expected).abs() < 1e-6
                    && stats.min <= stats.mean + 1e-9
                    && stats.mean <= stats.max + 1e-9
            }
        }
    }

    #[quickcheck]
    fn feasibility_rate_counts_feasible_records(flags: Vec<bool>) -> bool {
        if flags.is_empty() {
            return true;
        }
        let records: Vec<ResultRecord> = flags
            .iter()
            .map(|&feasible| {
                let value = if feasible {
                    Outcome::Feasible(1.0)
                } else {
                    Outcome::from_objective(f64::INFINITY)
                };
                record(10, 1.0, 1.0, value)
            })
            .collect();
        let expected = flags.iter().filter(|&&f| f).count() as f64 / flags.len() as f64;
        summarize(&records).unwrap().feasibility_rate == expected
    }
}
