mod convergence;

pub use convergence::{axis_range, plot_convergence};
