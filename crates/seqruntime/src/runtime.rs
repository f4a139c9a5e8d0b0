use crate::{ProcedureRunner, RunResult};
use seqcore::{EventBus, ExecutionEvent, Procedure, SequencerError};
use std::sync::Arc;

/// Main host facade: a runner plus the event bus its instructions report to
pub struct Sequencer {
    runner: Arc<ProcedureRunner>,
    event_bus: Arc<EventBus>,
}

impl Sequencer {
    /// Create a sequencer over the global registries with default settings
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_runner(ProcedureRunner::new(), config)
    }

    pub fn with_runner(runner: ProcedureRunner, config: RuntimeConfig) -> Self {
        Self {
            runner: Arc::new(runner),
            event_bus: Arc::new(EventBus::new(config.event_buffer_size)),
        }
    }

    pub fn validate(&self, procedure: &Procedure) -> Result<(), SequencerError> {
        self.runner.validate(procedure)
    }

    pub async fn run(&self, procedure: &Procedure) -> Result<RunResult, SequencerError> {
        self.runner.run(procedure, &self.event_bus).await
    }

    /// Subscribe to execution events
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<ExecutionEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the sequencer host
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1000,
        }
    }
}
