//! Typed result records as written by the GRASP runs.

use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Objective value reported by a run.
///
/// Infeasible runs are written with an infinite objective; anything that is
/// not strictly below `+inf` (including `NaN`) is treated as infeasible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Feasible(f64),
    Infeasible,
}

impl Outcome {
    pub fn from_objective(value: f64) -> Self {
        if value < f64::INFINITY {
            Outcome::Feasible(value)
        } else {
            Outcome::Infeasible
        }
    }

    pub fn is_feasible(&self) -> bool {
        matches!(self, Outcome::Feasible(_))
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Outcome::from_objective(value)),
            // "Infinity", "inf", "NaN", "-Infinity", "12.5", ...
            Raw::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Outcome::from_objective)
                .map_err(|_| D::Error::custom(format!("invalid objective value {:?}", text))),
        }
    }
}

/// One entry of an iteration trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    pub iteration: u64,
    pub value: f64,
}

impl<'de> Deserialize<'de> for TracePoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Either a plain pair or a serialized (int, int) tuple.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Pair(u64, f64),
            Tuple {
                #[serde(rename = "Item1")]
                item1: u64,
                #[serde(rename = "Item2")]
                item2: f64,
            },
        }

        let (iteration, value) = match Raw::deserialize(deserializer)? {
            Raw::Pair(iteration, value) => (iteration, value),
            Raw::Tuple { item1, item2 } => (item1, item2),
        };
        Ok(TracePoint { iteration, value })
    }
}

/// How `RuntimeSeconds` was derived from the `Runtime` field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RuntimeSeconds {
    Parsed(f64),
    #[default]
    Missing,
    Malformed(String),
}

impl RuntimeSeconds {
    pub fn seconds(&self) -> f64 {
        match self {
            RuntimeSeconds::Parsed(seconds) => *seconds,
            RuntimeSeconds::Missing | RuntimeSeconds::Malformed(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultRecord {
    #[serde(default, deserialize_with = "node_count")]
    pub num_nodes: Option<u64>,
    pub value: Option<Outcome>,
    #[serde(default, deserialize_with = "gap_percent")]
    pub gap_percent: Option<f64>,
    #[serde(default, deserialize_with = "trace_if_sequence")]
    pub iteration_log: Option<Vec<TracePoint>>,
    pub solver: Option<String>,
    // Non-string runtimes keep their JSON text and fail to parse later.
    #[serde(default, deserialize_with = "runtime_text")]
    pub runtime: Option<String>,

    // Derived by the loader.
    #[serde(skip)]
    pub runtime_seconds: RuntimeSeconds,
    #[serde(skip)]
    pub graph_name: String,
}

impl ResultRecord {
    pub fn is_feasible(&self) -> bool {
        self.value.map_or(false, |value| value.is_feasible())
    }

    /// The iteration trace, if the record carries a non-empty one.
    pub fn trace(&self) -> Option<&[TracePoint]> {
        self.iteration_log
            .as_deref()
            .filter(|trace| !trace.is_empty())
    }
}

// Whole-number floats such as `10.0` are accepted as node counts.
fn node_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|count| count.fract() == 0.0 && *count >= 0.0 && *count <= u64::MAX as f64)
                    .map(|count| count as u64)
            })
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid node count {}", number))),
        other => Err(D::Error::custom(format!("invalid node count {}", other))),
    }
}

// A `NaN` gap counts as no gap at all.
fn gap_percent<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let gap = match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Number(number) => number.as_f64(),
        Value::String(text) => Some(
            text.trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("invalid gap {:?}", text)))?,
        ),
        other => return Err(D::Error::custom(format!("invalid gap {}", other))),
    };
    Ok(gap.filter(|gap| !gap.is_nan()))
}

// Only sequences are traces; anything else is ignored for plotting.
fn trace_if_sequence<'de, D>(deserializer: D) -> Result<Option<Vec<TracePoint>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        trace @ Value::Array(_) => serde_json::from_value(trace).map(Some).map_err(D::Error::custom),
        other => {
            warn!(iteration_log = %other, "IterationLog is not a sequence, ignoring it");
            Ok(None)
        }
    }
}

fn runtime_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

#[test]
fn infinite_objective_is_infeasible() {
    assert_eq!(Outcome::from_objective(f64::INFINITY), Outcome::Infeasible);
    assert_eq!(Outcome::from_objective(f64::NAN), Outcome::Infeasible);
    assert_eq!(Outcome::from_objective(12.0), Outcome::Feasible(12.0));
    assert!(Outcome::from_objective(f64::NEG_INFINITY).is_feasible());
}

#[test]
fn objective_values_from_json() {
    let outcome: Outcome = serde_json::from_str("100.0").unwrap();
    assert_eq!(outcome, Outcome::Feasible(100.0));
    let outcome: Outcome = serde_json::from_str("\"Infinity\"").unwrap();
    assert_eq!(outcome, Outcome::Infeasible);
    let outcome: Outcome = serde_json::from_str("\"inf\"").unwrap();
    assert_eq!(outcome, Outcome::Infeasible);
    let outcome: Outcome = serde_json::from_str("\"NaN\"").unwrap();
    assert_eq!(outcome, Outcome::Infeasible);
    let outcome: Outcome = serde_json::from_str("\"-Infinity\"").unwrap();
    assert!(outcome.is_feasible());
    assert!(serde_json::from_str::<Outcome>("\"unknown\"").is_err());
}

#[test]
fn trace_points_accept_pairs_and_tuples() {
    let trace: Vec<TracePoint> =
        serde_json::from_str(r#"[[1, 50.0], {"Item1": 2, "Item2": 45}]"#).unwrap();
    assert_eq!(
        trace,
        vec![
            TracePoint { iteration: 1, value: 50.0 },
            TracePoint { iteration: 2, value: 45.0 },
        ]
    );
}

#[test]
fn record_fields_are_optional() {
    let record: ResultRecord = serde_json::from_str(r#"{"D1": [1, 2], "D2": []}"#).unwrap();
    assert_eq!(record.num_nodes, None);
    assert_eq!(record.value, None);
    assert_eq!(record.gap_percent, None);
    assert_eq!(record.iteration_log, None);
    assert_eq!(record.runtime_seconds, RuntimeSeconds::Missing);
    assert!(!record.is_feasible());
}

#[test]
fn record_reads_solver_output() {
    let record: ResultRecord = serde_json::from_str(
        r#"{
            "NumNodes": 20,
            "Value": 7,
            "Solver": "GRASP",
            "GapPercent": 1.5,
            "Runtime": "0:00:02.5",
            "IterationLog": null
        }"#,
    )
    .unwrap();
    assert_eq!(record.num_nodes, Some(20));
    assert_eq!(record.value, Some(Outcome::Feasible(7.0)));
    assert_eq!(record.solver.as_deref(), Some("GRASP"));
    assert_eq!(record.gap_percent, Some(1.5));
    assert_eq!(record.runtime.as_deref(), Some("0:00:02.5"));
    assert_eq!(record.trace(), None);
}

#[test]
fn empty_trace_is_not_plotted() {
    let record: ResultRecord = serde_json::from_str(r#"{"IterationLog": []}"#).unwrap();
    assert_eq!(record.iteration_log, Some(vec![]));
    assert_eq!(record.trace(), None);
}

#[test]
fn node_counts_accept_whole_floats() {
    let record: ResultRecord = serde_json::from_str(r#"{"NumNodes": 10.0}"#).unwrap();
    assert_eq!(record.num_nodes, Some(10));
    assert!(serde_json::from_str::<ResultRecord>(r#"{"NumNodes": 10.5}"#).is_err());
    assert!(serde_json::from_str::<ResultRecord>(r#"{"NumNodes": -1}"#).is_err());
}

#[test]
fn non_sequence_trace_is_ignored() {
    for log in [r#""none""#, "{}", "3"] {
        let record: ResultRecord =
            serde_json::from_str(&format!(r#"{{"IterationLog": {}}}"#, log)).unwrap();
        assert_eq!(record.iteration_log, None);
        assert_eq!(record.trace(), None);
    }
}

#[test]
fn non_string_runtime_keeps_its_text() {
    let record: ResultRecord = serde_json::from_str(r#"{"Runtime": 90.5}"#).unwrap();
    assert_eq!(record.runtime.as_deref(), Some("90.5"));
    let record: ResultRecord = serde_json::from_str(r#"{"Runtime": {"Ticks": 1}}"#).unwrap();
    assert_eq!(record.runtime.as_deref(), Some(r#"{"Ticks":1}"#));
}

#[test]
fn nan_gap_is_skipped() {
    let record: ResultRecord = serde_json::from_str(r#"{"GapPercent": "NaN"}"#).unwrap();
    assert_eq!(record.gap_percent, None);
    let record: ResultRecord = serde_json::from_str(r#"{"GapPercent": 2}"#).unwrap();
    assert_eq!(record.gap_percent, Some(2.0));
}
