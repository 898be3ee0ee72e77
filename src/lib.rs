pub mod analyzers;
pub mod charts;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod ingest;
pub mod interactive;
pub mod models;
pub mod providers;
pub mod storage;
pub mod utils;
pub mod web;
pub mod writers;

pub use error::{MonitorError, Result};
