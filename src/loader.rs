use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use glob::glob;
use tracing::{debug, info, warn};

use crate::{
    duration::parse_runtime,
    error::{AnalysisError, Result},
    record::{ResultRecord, RuntimeSeconds},
};

pub const RESULT_SUFFIX: &str = "_GRASP";

// Bare literals some JSON writers emit for non-finite floats.
const NON_FINITE: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Finds every `*_GRASP.json` below `root` (at any depth) and parses it.
pub fn load_results(root: impl AsRef<Path>) -> Result<Vec<ResultRecord>> {
    let root = root.as_ref();
    let pattern = format!("{}/**/*{}.json", root.display(), RESULT_SUFFIX);

    let mut results = Vec::new();
    for entry in glob(&pattern)? {
        let path = entry.map_err(|err| {
            let path = err.path().to_path_buf();
            AnalysisError::io(path, err.into_error())
        })?;
        let text = fs::read_to_string(&path).map_err(|err| AnalysisError::io(&path, err))?;
        let record = parse_record(&path, &text)?;
        debug!(graph = %record.graph_name, path = %path.display(), "loaded result");
        results.push(record);
    }

    if results.is_empty() {
        warn!(root = %root.display(), "no result files found");
    } else {
        info!(count = results.len(), root = %root.display(), "loaded results");
    }
    Ok(results)
}

/// Parses a single result document and attaches the derived fields.
pub fn parse_record(path: &Path, text: &str) -> Result<ResultRecord> {
    let mut record: ResultRecord =
        serde_json::from_str(&quote_non_finite(text)).map_err(|source| AnalysisError::Json {
            path: PathBuf::from(path),
            source,
        })?;

    record.runtime_seconds = match record.runtime.as_deref() {
        None => RuntimeSeconds::Missing,
        Some(runtime) => match parse_runtime(runtime) {
            Ok(seconds) => RuntimeSeconds::Parsed(seconds),
            Err(err) => {
                warn!(path = %path.display(), %err, "unparseable runtime, using 0s");
                RuntimeSeconds::Malformed(runtime.to_string())
            }
        },
    };
    record.graph_name = graph_name_from_path(path);
    Ok(record)
}

/// Quotes bare `Infinity`, `-Infinity` and `NaN` tokens so serde_json reads
/// them as strings. Text inside string literals is left alone.
pub fn quote_non_finite(text: &str) -> Cow<'_, str> {
    if !text.contains("Infinity") && !text.contains("NaN") {
        return Cow::Borrowed(text);
    }

    let mut quoted = String::with_capacity(text.len() + 8);
    let mut rest = text;
    let mut in_string = false;
    let mut escaped = false;
    while let Some(c) = rest.chars().next() {
        if !in_string {
            if let Some(token) = NON_FINITE.iter().find(|token| rest.starts_with(**token)) {
                quoted.push('"');
                quoted.push_str(token);
                quoted.push('"');
                rest = &rest[token.len()..];
                continue;
            }
            in_string = c == '"';
        } else if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            in_string = false;
        }
        quoted.push(c);
        rest = &rest[c.len_utf8()..];
    }
    Cow::Owned(quoted)
}

pub fn graph_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    stem.replace(RESULT_SUFFIX, "")
}

#[test]
fn graph_name_strips_suffix() {
    assert_eq!(graph_name_from_path(Path::new("runs/G1_d0.3_p0.1_S4_GRASP.json")), "G1_d0.3_p0.1_S4");
    assert_eq!(graph_name_from_path(Path::new("A_GRASP.json")), "A");
}

#[test]
fn parse_record_derives_runtime() {
    let record = parse_record(
        Path::new("A_GRASP.json"),
        r#"{"Runtime": "0:01:30.5", "NumNodes": 10}"#,
    )
    .unwrap();
    assert_eq!(record.runtime_seconds, RuntimeSeconds::Parsed(90.5));
    assert_eq!(record.graph_name, "A");
}

#[test]
fn malformed_runtime_defaults_to_zero() {
    let record = parse_record(Path::new("B_GRASP.json"), r#"{"Runtime": "soon"}"#).unwrap();
    assert_eq!(record.runtime_seconds, RuntimeSeconds::Malformed("soon".to_string()));
    assert_eq!(record.runtime_seconds.seconds(), 0.0);

    let record = parse_record(Path::new("C_GRASP.json"), "{}").unwrap();
    assert_eq!(record.runtime_seconds, RuntimeSeconds::Missing);
    assert_eq!(record.runtime_seconds.seconds(), 0.0);
}

#[test]
fn bare_non_finite_literals_are_quoted() {
    assert_eq!(
        quote_non_finite(r#"{"Value": Infinity, "Gap": -Infinity, "X": [NaN]}"#),
        r#"{"Value": "Infinity", "Gap": "-Infinity", "X": ["NaN"]}"#
    );
    // Strings stay as they are, escaped quotes included.
    let text = r#"{"Solver": "NaN \" Infinity", "Value": 3}"#;
    assert_eq!(quote_non_finite(text), text);
    assert!(matches!(quote_non_finite("{}"), Cow::Borrowed(_)));
}

#[test]
fn bare_infinity_value_is_infeasible() {
    let record = parse_record(
        Path::new("A_GRASP.json"),
        r#"{"NumNodes": 10, "GapPercent": NaN, "Value": Infinity}"#,
    )
    .unwrap();
    assert_eq!(record.value, Some(crate::record::Outcome::Infeasible));
    assert_eq!(record.gap_percent, None);

    let record = parse_record(Path::new("B_GRASP.json"), r#"{"Value": -Infinity}"#).unwrap();
    assert!(record.is_feasible());
}

#[test]
fn odd_fields_do_not_abort_parsing() {
    let record = parse_record(
        Path::new("A_GRASP.json"),
        r#"{"NumNodes": 10.0, "GapPercent": 1.0, "Value": 5, "IterationLog": "none", "Runtime": 90.5}"#,
    )
    .unwrap();
    assert_eq!(record.num_nodes, Some(10));
    assert_eq!(record.trace(), None);
    assert_eq!(record.runtime_seconds, RuntimeSeconds::Malformed("90.5".to_string()));
    assert_eq!(record.runtime_seconds.seconds(), 0.0);

    let record = parse_record(
        Path::new("B_GRASP.json"),
        r#"{"IterationLog": {}, "Runtime": {"Ticks": 905000000}}"#,
    )
    .unwrap();
    assert_eq!(record.iteration_log, None);
    assert!(matches!(record.runtime_seconds, RuntimeSeconds::Malformed(_)));
}

#[test]
fn parse_record_reports_the_file() {
    let err = parse_record(Path::new("bad_GRASP.json"), "{ not json").unwrap_err();
    match err {
        AnalysisError::Json { path, .. } => assert_eq!(path, PathBuf::from("bad_GRASP.json")),
        other => panic!("unexpected error {:?}", other),
    }
}
