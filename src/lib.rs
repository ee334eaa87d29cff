pub mod cli;
pub mod duration;
pub mod error;
pub mod loader;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod report;
pub mod visuals;

pub use error::{AnalysisError, Result};
pub use loader::load_results;
pub use metrics::{analyze, summarize, GapStats, MetricsSummary};
pub use record::{Outcome, ResultRecord, RuntimeSeconds, TracePoint};
