//! Batch ETL for daily stock prices: CSV in, SQL table out.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

pub use config::EtlConfig;
pub use error::{EtlError, ExtractionError, LoadError, TransformationError};
pub use pipeline::{Pipeline, RunReport, RunState};
pub use types::{Column, ColumnType, RecordBatch, Value};
