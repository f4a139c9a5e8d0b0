use crate::ExecutionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub type ExecutionId = Uuid;

/// User-interface sink that instructions report through.
pub trait UserInterface: Send + Sync {
    fn report_message(&self, message: &str);

    fn report_failure(&self, message: &str);
}

/// Events emitted while a procedure runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExecutionEvent {
    ProcedureStarted {
        execution_id: ExecutionId,
        procedure: String,
        timestamp: DateTime<Utc>,
    },
    ProcedureCompleted {
        execution_id: ExecutionId,
        status: ExecutionStatus,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    InstructionStarted {
        execution_id: ExecutionId,
        index: usize,
        instruction_type: String,
        name: Option<String>,
        timestamp: DateTime<Utc>,
    },
    InstructionCompleted {
        execution_id: ExecutionId,
        index: usize,
        status: ExecutionStatus,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    InstructionMessage {
        execution_id: ExecutionId,
        index: usize,
        message: UiMessage,
        timestamp: DateTime<Utc>,
    },
}

/// Messages an instruction reports to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum UiMessage {
    Info { message: String },
    Failure { message: String },
}

/// Per-instruction user interface that forwards reports to the event bus
#[derive(Clone)]
pub struct EventEmitter {
    execution_id: ExecutionId,
    index: usize,
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventEmitter {
    pub fn new(
        execution_id: ExecutionId,
        index: usize,
        sender: broadcast::Sender<ExecutionEvent>,
    ) -> Self {
        Self {
            execution_id,
            index,
            sender,
        }
    }

    pub fn emit(&self, message: UiMessage) {
        let _ = self.sender.send(ExecutionEvent::InstructionMessage {
            execution_id: self.execution_id,
            index: self.index,
            message,
            timestamp: Utc::now(),
        });
    }
}

impl UserInterface for EventEmitter {
    fn report_message(&self, message: &str) {
        tracing::info!(index = self.index, "{}", message);
        self.emit(UiMessage::Info {
            message: message.to_string(),
        });
    }

    fn report_failure(&self, message: &str) {
        tracing::warn!(index = self.index, "{}", message);
        self.emit(UiMessage::Failure {
            message: message.to_string(),
        });
    }
}

/// Global event bus
pub struct EventBus {
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ExecutionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn create_emitter(&self, execution_id: ExecutionId, index: usize) -> EventEmitter {
        EventEmitter::new(execution_id, index, self.sender.clone())
    }
}
