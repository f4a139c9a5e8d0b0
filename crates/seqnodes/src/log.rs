use crate::util::{report_outcome, INPUT_VAR_ATTRIBUTE};
use async_trait::async_trait;
use seqcore::{
    AttributeStore, ExecutionStatus, Instruction, NodeError, RegistryError, SetupError,
    UserInterface, Workspace,
};
use seqruntime::{InstructionRegistry, NodeDescriptor};

pub const LOG_TYPE: &str = "Log";
pub const MESSAGE_ATTRIBUTE: &str = "message";

/// Reports a message and/or a workspace value to the user interface
pub struct LogInstruction {
    attributes: AttributeStore,
}

impl LogInstruction {
    pub fn new() -> Self {
        Self {
            attributes: AttributeStore::new(),
        }
    }

    fn create() -> Box<dyn Instruction> {
        Box::new(Self::new())
    }

    fn compose(&self, workspace: &dyn Workspace) -> Result<String, NodeError> {
        let message = self.attributes.get(MESSAGE_ATTRIBUTE).unwrap_or_default();
        let Some(var_name) = self.attributes.get(INPUT_VAR_ATTRIBUTE) else {
            return Ok(message.to_string());
        };
        let value = workspace
            .get_value(var_name)
            .ok_or_else(|| NodeError::UnavailableSource(var_name.to_string()))?;
        if message.is_empty() {
            Ok(format!("{}: {}", var_name, value))
        } else {
            Ok(format!("{} {}: {}", message, var_name, value))
        }
    }
}

impl Default for LogInstruction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Instruction for LogInstruction {
    fn instruction_type(&self) -> &str {
        LOG_TYPE
    }

    fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        if !self.attributes.has(MESSAGE_ATTRIBUTE) && !self.attributes.has(INPUT_VAR_ATTRIBUTE) {
            return Err(SetupError::Configuration(format!(
                "{} requires '{}' or '{}'",
                LOG_TYPE, MESSAGE_ATTRIBUTE, INPUT_VAR_ATTRIBUTE
            )));
        }
        Ok(())
    }

    async fn execute(&self, ui: &dyn UserInterface, workspace: &dyn Workspace) -> ExecutionStatus {
        report_outcome(ui, "Log failed", self.compose(workspace))
    }
}

pub fn register(registry: &InstructionRegistry) -> Result<(), RegistryError> {
    registry.register(
        NodeDescriptor::new(LOG_TYPE, LogInstruction::create)
            .with_metadata("debug", "Report a message or workspace value"),
    )
}
