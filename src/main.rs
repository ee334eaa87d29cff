use color_eyre::eyre::WrapErr;
use color_eyre::Report;

use grasp_analysis::{cli, loader, logger, metrics, report};

fn main() -> Result<(), Report> {
    color_eyre::install()?;
    let arguments = cli::cli();
    logger::init(arguments.verbosity);

    let results = loader::load_results(&arguments.experiment)
        .wrap_err_with(|| format!("load results from {}", arguments.experiment.display()))?;
    let summary = metrics::analyze(&results, arguments.plot.as_deref()).wrap_err("analyze results")?;

    report::write_metrics(&summary, &arguments.output).wrap_err("write metrics")?;
    if let Some(records_csv) = &arguments.records_csv {
        report::write_records_csv(&results, records_csv).wrap_err("write record table")?;
    }

    println!("Analysis complete. Results saved to {}", arguments.output.display());
    Ok(())
}
