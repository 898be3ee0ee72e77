pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod logging;
pub mod progress;
pub mod timestamp;

pub use constants::*;
pub use coordinates::{format_coordinates, validate_coordinates};
pub use filename::{
    attachment_filename, generate_default_chart_filename, generate_default_export_filename,
};
pub use logging::{init_logging, LogSettings};
pub use progress::ProgressReporter;
pub use timestamp::{format_canonical, parse_filter_bound, parse_timestamp, RangeBound};
