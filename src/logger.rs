use tracing::Level;

use crate::cli::Verbosity;

pub fn level(verbosity: Verbosity) -> Level {
    match verbosity {
        Verbosity::Quiet => Level::ERROR,
        Verbosity::Normal => Level::INFO,
        Verbosity::Verbose => Level::DEBUG,
        Verbosity::Trace => Level::TRACE,
    }
}

// Logs go to stderr so stdout only carries the completion message.
pub fn init(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_max_level(level(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[test]
fn verbosity_maps_to_level() {
    assert_eq!(level(Verbosity::Quiet), Level::ERROR);
    assert_eq!(level(Verbosity::Normal), Level::INFO);
    assert_eq!(level(Verbosity::Verbose), Level::DEBUG);
    assert_eq!(level(Verbosity::Trace), Level::TRACE);
}
