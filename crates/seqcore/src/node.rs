use crate::{AttributeStore, NodeError, SetupError, TypedValue, UserInterface, Workspace};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a single instruction execution, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Success,
    Failure,
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

/// Core trait that all executable plugin nodes implement
#[async_trait]
pub trait Instruction: Send + Sync {
    /// Registered type name (e.g. "ChannelWrite")
    fn instruction_type(&self) -> &str;

    fn attributes(&self) -> &AttributeStore;

    /// Used by the host to populate attributes before `setup`.
    fn attributes_mut(&mut self) -> &mut AttributeStore;

    /// Validate attributes once, before any execution. An error here is fatal
    /// for the node.
    fn setup(&mut self) -> Result<(), SetupError> {
        Ok(())
    }

    /// Run the instruction once. Failures are reported through `ui` and mapped
    /// to `ExecutionStatus::Failure`; they never escape as errors.
    async fn execute(&self, ui: &dyn UserInterface, workspace: &dyn Workspace) -> ExecutionStatus;

    /// Optional: drop per-run resources
    fn reset(&mut self) {}
}

/// Named value holder living in a procedure's workspace.
pub trait Variable: Send + Sync {
    fn variable_type(&self) -> &str;

    fn attributes(&self) -> &AttributeStore;

    fn attributes_mut(&mut self) -> &mut AttributeStore;

    fn setup(&mut self) -> Result<(), SetupError>;

    /// Current value, `None` while unavailable.
    fn get_value(&self) -> Option<TypedValue>;

    fn set_value(&self, value: TypedValue) -> Result<(), NodeError>;

    fn is_available(&self) -> bool {
        self.get_value().is_some()
    }

    fn reset(&mut self) {}
}
