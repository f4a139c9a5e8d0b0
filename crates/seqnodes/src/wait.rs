use crate::util::timeout_attribute;
use async_trait::async_trait;
use seqcore::{
    AttributeStore, ExecutionStatus, Instruction, RegistryError, SetupError, UserInterface,
    Workspace,
};
use seqruntime::{InstructionRegistry, NodeDescriptor};
use std::time::Duration;
use tokio::time::sleep;

pub const WAIT_TYPE: &str = "Wait";

/// Delay execution for `timeout` seconds
pub struct WaitInstruction {
    attributes: AttributeStore,
    duration: Duration,
}

impl WaitInstruction {
    pub fn new() -> Self {
        Self {
            attributes: AttributeStore::new(),
            duration: Duration::ZERO,
        }
    }

    fn create() -> Box<dyn Instruction> {
        Box::new(Self::new())
    }
}

impl Default for WaitInstruction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Instruction for WaitInstruction {
    fn instruction_type(&self) -> &str {
        WAIT_TYPE
    }

    fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        self.duration = timeout_attribute(&self.attributes, Duration::ZERO)?;
        Ok(())
    }

    async fn execute(&self, ui: &dyn UserInterface, _workspace: &dyn Workspace) -> ExecutionStatus {
        tracing::debug!("Waiting for {:?}", self.duration);
        sleep(self.duration).await;
        ui.report_message(&format!("Waited {}s", self.duration.as_secs_f64()));
        ExecutionStatus::Success
    }
}

pub fn register(registry: &InstructionRegistry) -> Result<(), RegistryError> {
    registry.register(
        NodeDescriptor::new(WAIT_TYPE, WaitInstruction::create)
            .with_metadata("time", "Delay execution for the given number of seconds"),
    )
}
