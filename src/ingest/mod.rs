//! Per-region ingestion of provider data into the store.

pub mod pipeline;

pub use pipeline::{BatchReport, IngestPipeline, RegionFailure, RegionYield};
