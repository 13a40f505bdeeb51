// Batch pipeline: extract from CSV, transform, load into SQL

pub mod extract;
pub mod load;
pub mod observer;
pub mod orchestrator;
pub mod transform;

// Re-export key types and functions from each stage
pub use extract::{extract, extract_from_reader, parse_cutoff};
pub use load::{load, load_into, LoadSummary};
pub use observer::{RecordingObserver, RunObserver, TracingObserver};
pub use orchestrator::{Pipeline, RunReport, RunState};
pub use transform::{normalize_column_name, transform};
