use super::{RunReport, RunState};
use tracing::debug;

/// Receives run progress from the orchestrator.
///
/// Logging goes through `tracing` regardless; an observer is for callers that
/// want to react to the run (tests, embedding applications).
pub trait RunObserver {
    fn on_state(&mut self, state: RunState);

    fn on_finish(&mut self, _report: &RunReport) {}
}

/// Default observer: records transitions in the debug log.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_state(&mut self, state: RunState) {
        debug!(?state, "ETL state transition");
    }
}

/// Keeps every state it is told about, in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub states: Vec<RunState>,
    pub finished: bool,
}

impl RunObserver for RecordingObserver {
    fn on_state(&mut self, state: RunState) {
        self.states.push(state);
    }

    fn on_finish(&mut self, _report: &RunReport) {
        self.finished = true;
    }
}
