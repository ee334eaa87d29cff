use std::{fs, path::Path};

use tracing::info;

use crate::{
    error::{AnalysisError, Result},
    metrics::MetricsSummary,
    record::{Outcome, ResultRecord},
};

pub const CSV_HEADER: [&str; 7] = [
    "GraphName",
    "Solver",
    "NumNodes",
    "Value",
    "Feasible",
    "GapPercent",
    "RuntimeSeconds",
];

pub fn write_metrics(summary: &MetricsSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json).map_err(|err| AnalysisError::io(path, err))?;
    info!(path = %path.display(), "wrote metrics");
    Ok(())
}

/// One row per record, in load order.
pub fn write_records_csv(records: &[ResultRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;

    for record in records {
        let value = match record.value {
            Some(Outcome::Feasible(value)) => value.to_string(),
            Some(Outcome::Infeasible) => "Infinity".to_string(),
            None => String::new(),
        };
        let feasible = match record.value {
            Some(outcome) => outcome.is_feasible().to_string(),
            None => String::new(),
        };
        writer.write_record([
            record.graph_name.clone(),
            record.solver.clone().unwrap_or_default(),
            optional(record.num_nodes),
            value,
            feasible,
            optional(record.gap_percent),
            record.runtime_seconds.seconds().to_string(),
        ])?;
    }

    writer.flush().map_err(|err| AnalysisError::io(path, err))?;
    info!(rows = records.len(), path = %path.display(), "wrote record table");
    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
