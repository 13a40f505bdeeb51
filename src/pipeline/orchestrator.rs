use super::extract::{extract, parse_cutoff};
use super::load::{load, LoadSummary};
use super::observer::{RunObserver, TracingObserver};
use super::transform::transform;
use crate::config::EtlConfig;
use crate::error::EtlError;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span};
use uuid::Uuid;

/// Where a run is. A successful run visits
/// `Started → Extracted → Transformed → Loaded → Finished`; a failed one
/// `Started → Failed → Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Started,
    Extracted,
    Transformed,
    Loaded,
    Failed,
    Finished,
}

/// Result of one run, returned instead of being swallowed so the caller can
/// pick an exit code.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub cutoff: String,
    pub outcome: Result<LoadSummary, EtlError>,
    pub states: Vec<RunState>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&EtlError> {
        self.outcome.as_ref().err()
    }

    pub fn rows_loaded(&self) -> usize {
        self.outcome.as_ref().map(|s| s.rows_written).unwrap_or(0)
    }
}

/// Runs extract, transform and load in sequence for one configuration.
pub struct Pipeline<O: RunObserver = TracingObserver> {
    config: EtlConfig,
    observer: O,
}

impl Pipeline<TracingObserver> {
    pub fn new(config: EtlConfig) -> Self {
        Self::with_observer(config, TracingObserver)
    }
}

impl<O: RunObserver> Pipeline<O> {
    pub fn with_observer(config: EtlConfig, observer: O) -> Self {
        Self { config, observer }
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Runs every stage for rows dated before `cutoff` (`YYYY-MM-DD`).
    ///
    /// Stops at the first failing stage; never retries. Always logs the
    /// elapsed time and the finish marker.
    pub fn run(&mut self, cutoff: &str) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("etl_run", %run_id, table = %self.config.table_name);
        let _enter = span.enter();

        info!("==== ETL PIPELINE STARTED ====");
        let started_at = Instant::now();
        let mut states = Vec::with_capacity(6);
        self.enter(&mut states, RunState::Started);

        let outcome = self.run_stages(cutoff, &mut states);

        if let Err(e) = &outcome {
            error!(severity = "critical", "ETL process failed: {}. See logs for details.", e);
            self.enter(&mut states, RunState::Failed);
        }

        let elapsed = started_at.elapsed();
        info!("==== ETL PIPELINE FINISHED in {:.2}s ====", elapsed.as_secs_f64());
        self.enter(&mut states, RunState::Finished);

        let report = RunReport {
            run_id,
            cutoff: cutoff.to_string(),
            outcome,
            states,
            elapsed,
        };
        self.observer.on_finish(&report);
        report
    }

    fn run_stages(
        &mut self,
        cutoff: &str,
        states: &mut Vec<RunState>,
    ) -> Result<LoadSummary, EtlError> {
        let cutoff_date = parse_cutoff(cutoff).map_err(|e| {
            error!("Extraction failed: {}", e);
            e
        })?;

        let extracted = extract(&self.config.csv_path, cutoff_date)?;
        self.enter(states, RunState::Extracted);

        let cleaned = transform(extracted)?;
        self.enter(states, RunState::Transformed);

        let summary = load(cleaned, &self.config.database_uri, &self.config.table_name)?;
        self.enter(states, RunState::Loaded);

        Ok(summary)
    }

    fn enter(&mut self, states: &mut Vec<RunState>, state: RunState) {
        states.push(state);
        self.observer.on_state(state);
    }
}
