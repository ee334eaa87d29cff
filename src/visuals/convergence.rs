use std::{error::Error, ops::Range, path::Path};

use plotters::prelude::*;
use tracing::info;

use crate::{
    error::{AnalysisError, Result},
    record::{ResultRecord, TracePoint},
};

const SIZE: (u32, u32) = (1000, 600);
const LINE_ALPHA: f64 = 0.4;

/// Draws one line per record that has an iteration trace and writes the
/// chart to `path`, replacing any existing file.
pub fn plot_convergence(records: &[ResultRecord], path: &Path) -> Result<()> {
    let traces: Vec<&[TracePoint]> = records.iter().filter_map(|record| record.trace()).collect();

    create_convergence_plot(&traces, path, true).map_err(|err| AnalysisError::Plot(err.to_string()))?;

    info!(traces = traces.len(), path = %path.display(), "wrote convergence plot");
    Ok(())
}

// Without labels nothing needs a font, so the chart renders anywhere.
fn create_convergence_plot(
    traces: &[&[TracePoint]],
    path: &Path,
    labelled: bool,
) -> std::result::Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let points = move || traces.iter().flat_map(|trace| trace.iter()).filter(|point| point.value.is_finite());
    let x_range = axis_range(points().map(|point| point.iteration as f64));
    let y_range = axis_range(points().map(|point| point.value));

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if labelled {
        builder
            .caption("GRASP Convergence Patterns", ("sans-serif", 30).into_font())
            .x_label_area_size(40)
            .y_label_area_size(60);
    }
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

    if labelled {
        chart
            .configure_mesh()
            .x_desc("Iteration")
            .y_desc("Objective Value")
            .draw()?;
    }

    for (color_index, trace) in traces.iter().enumerate() {
        let color = Palette99::pick(color_index).mix(LINE_ALPHA);
        let line = trace
            .iter()
            .filter(|point| point.value.is_finite())
            .map(|point| (point.iteration as f64, point.value));
        chart.draw_series(LineSeries::new(line, &color))?;
    }

    root.present()?;
    Ok(())
}

/// Smallest range covering `values`, widened when it would be empty.
pub fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
        (min.min(value), max.max(value))
    });

    if min > max {
        0.0..1.0
    } else if min == max {
        min - 1.0..max + 1.0
    } else {
        min..max
    }
}

#[test]
fn axis_range_covers_values() {
    assert_eq!(axis_range(vec![3.0, -1.0, 7.5].into_iter()), -1.0..7.5);
}

#[test]
fn axis_range_of_a_single_value_is_widened() {
    assert_eq!(axis_range(std::iter::once(4.0)), 3.0..5.0);
    assert_eq!(axis_range(std::iter::empty()), 0.0..1.0);
}

#[test]
fn unlabelled_chart_is_written() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("convergence.png");
    let first: &[TracePoint] = &[
        TracePoint { iteration: 1, value: 55.0 },
        TracePoint { iteration: 5, value: 48.0 },
    ];
    let second: &[TracePoint] = &[TracePoint { iteration: 2, value: 60.0 }];

    create_convergence_plot(&[first, second], &path, false).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);

    // An existing chart is replaced.
    create_convergence_plot(&[second], &path, false).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}
