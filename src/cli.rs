use std::path::PathBuf;

use clap::{command, Arg, ArgAction, ArgMatches, Command};

pub const DEFAULT_EXPERIMENT: &str = "../Data/Experiments/Latest";
pub const DEFAULT_OUTPUT: &str = "grasp_metrics.json";
pub const DEFAULT_PLOT: &str = "grasp_convergence.png";

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub experiment: PathBuf,
    pub output: PathBuf,
    // None when plotting is disabled.
    pub plot: Option<PathBuf>,
    pub records_csv: Option<PathBuf>,
    pub verbosity: Verbosity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Trace,
}

pub fn command() -> Command {
    command!("grasp-analyze")
        .about("Summarizes GRASP experiment results: gap statistics, runtime by problem size and feasibility rate.")
        .arg(
            Arg::new("experiment")
                .help("Experiment directory searched recursively for *_GRASP.json files")
                .required(false)
                .default_value(DEFAULT_EXPERIMENT)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .help("Where to write the metrics summary")
                .long("output")
                .short('o')
                .default_value(DEFAULT_OUTPUT),
        )
        .arg(
            Arg::new("plot")
                .help("Where to write the convergence plot")
                .long("plot")
                .short('p')
                .default_value(DEFAULT_PLOT),
        )
        .arg(
            Arg::new("no_plot")
                .help("Never render the convergence plot")
                .long("no-plot")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("records_csv")
                .help("Also write one CSV row per result record to this file")
                .long("records-csv"),
        )
        .arg(
            Arg::new("verbose")
                .help("Log more (repeat for trace output)")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .help("Only log errors")
                .long("quiet")
                .short('q')
                .conflicts_with("verbose")
                .action(ArgAction::SetTrue),
        )
}

pub fn cli() -> CliArgs {
    from_matches(&command().get_matches())
}

pub fn from_matches(arguments: &ArgMatches) -> CliArgs {
    let path = |id: &str| arguments.get_one::<String>(id).map(PathBuf::from);

    let experiment = path("experiment").unwrap_or_else(|| PathBuf::from(DEFAULT_EXPERIMENT));
    let output = path("output").unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let plot = if arguments.get_flag("no_plot") {
        None
    } else {
        Some(path("plot").unwrap_or_else(|| PathBuf::from(DEFAULT_PLOT)))
    };

    let verbosity = if arguments.get_flag("quiet") {
        Verbosity::Quiet
    } else {
        match arguments.get_count("verbose") {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Trace,
        }
    };

    CliArgs {
        experiment,
        output,
        plot,
        records_csv: path("records_csv"),
        verbosity,
    }
}
