use crate::util::{non_empty_attribute, report_outcome, INPUT_VAR_ATTRIBUTE, OUTPUT_VAR_ATTRIBUTE};
use async_trait::async_trait;
use seqcore::{
    AttributeStore, ExecutionStatus, Instruction, NodeError, RegistryError, SetupError,
    UserInterface, Workspace,
};
use seqruntime::{InstructionRegistry, NodeDescriptor};

pub const COPY_TYPE: &str = "Copy";

/// Copy one workspace variable into another
pub struct CopyInstruction {
    attributes: AttributeStore,
}

impl CopyInstruction {
    pub fn new() -> Self {
        Self {
            attributes: AttributeStore::new(),
        }
    }

    fn create() -> Box<dyn Instruction> {
        Box::new(Self::new())
    }

    fn copy(&self, workspace: &dyn Workspace) -> Result<String, NodeError> {
        let input = self.attributes.get(INPUT_VAR_ATTRIBUTE).unwrap_or_default();
        let output = self.attributes.get(OUTPUT_VAR_ATTRIBUTE).unwrap_or_default();
        let value = workspace
            .get_value(input)
            .ok_or_else(|| NodeError::UnavailableSource(input.to_string()))?;
        if !workspace.set_value(output, value) {
            return Err(NodeError::WorkspaceWrite(output.to_string()));
        }
        Ok(format!("Copied '{}' to '{}'", input, output))
    }
}

impl Default for CopyInstruction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Instruction for CopyInstruction {
    fn instruction_type(&self) -> &str {
        COPY_TYPE
    }

    fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        non_empty_attribute(&self.attributes, INPUT_VAR_ATTRIBUTE)?;
        non_empty_attribute(&self.attributes, OUTPUT_VAR_ATTRIBUTE)?;
        Ok(())
    }

    async fn execute(&self, ui: &dyn UserInterface, workspace: &dyn Workspace) -> ExecutionStatus {
        report_outcome(ui, "Copy failed", self.copy(workspace))
    }
}

pub fn register(registry: &InstructionRegistry) -> Result<(), RegistryError> {
    registry.register(
        NodeDescriptor::new(COPY_TYPE, CopyInstruction::create)
            .with_metadata("workspace", "Copy a workspace variable into another"),
    )
}
