use crate::util::{
    non_empty_attribute, report_outcome, timeout_attribute, CHANNEL_ATTRIBUTE, OUTPUT_VAR_ATTRIBUTE,
};
use async_trait::async_trait;
use seqcore::{
    AttributeStore, ChannelHandle, ChannelTransport, ExecutionStatus, Instruction,
    LocalChannelHub, NodeError, RegistryError, SetupError, UserInterface, Workspace,
    DEFAULT_CHANNEL_TIMEOUT,
};
use seqruntime::{InstructionRegistry, NodeDescriptor};
use std::sync::Arc;
use std::time::Duration;

pub const CHANNEL_READ_TYPE: &str = "ChannelRead";

/// Reads a channel into the workspace variable named by `outputVar`.
pub struct ChannelReadInstruction {
    attributes: AttributeStore,
    transport: Arc<dyn ChannelTransport>,
    config: Option<ReadConfig>,
}

#[derive(Debug, Clone)]
struct ReadConfig {
    channel: String,
    output_var: String,
    timeout: Duration,
}

impl ChannelReadInstruction {
    pub fn new() -> Self {
        Self::with_transport(LocalChannelHub::global())
    }

    pub fn with_transport(transport: Arc<dyn ChannelTransport>) -> Self {
        Self {
            attributes: AttributeStore::new(),
            transport,
            config: None,
        }
    }

    fn create() -> Box<dyn Instruction> {
        Box::new(Self::new())
    }

    async fn read_once(&self, workspace: &dyn Workspace) -> Result<String, NodeError> {
        let config = self.config.as_ref().ok_or(NodeError::NotSetup)?;

        let mut handle = ChannelHandle::new(config.channel.as_str());
        handle
            .connect(self.transport.as_ref(), config.timeout)
            .await?;
        let read = handle.read().await;
        handle.disconnect();
        let value = read?;

        let message = format!(
            "Read {} from channel '{}' into '{}'",
            value, config.channel, config.output_var
        );
        if !workspace.set_value(&config.output_var, value) {
            return Err(NodeError::WorkspaceWrite(config.output_var.clone()));
        }
        Ok(message)
    }
}

impl Default for ChannelReadInstruction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Instruction for ChannelReadInstruction {
    fn instruction_type(&self) -> &str {
        CHANNEL_READ_TYPE
    }

    fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        self.config = None;
        let channel = non_empty_attribute(&self.attributes, CHANNEL_ATTRIBUTE)?.to_string();
        let output_var = non_empty_attribute(&self.attributes, OUTPUT_VAR_ATTRIBUTE)?.to_string();
        let timeout = timeout_attribute(&self.attributes, DEFAULT_CHANNEL_TIMEOUT)?;
        self.config = Some(ReadConfig {
            channel,
            output_var,
            timeout,
        });
        Ok(())
    }

    async fn execute(&self, ui: &dyn UserInterface, workspace: &dyn Workspace) -> ExecutionStatus {
        let context = match &self.config {
            Some(config) => format!("{} from '{}' failed", CHANNEL_READ_TYPE, config.channel),
            None => format!("{} failed", CHANNEL_READ_TYPE),
        };
        report_outcome(ui, &context, self.read_once(workspace).await)
    }
}

pub fn register(registry: &InstructionRegistry) -> Result<(), RegistryError> {
    registry.register(
        NodeDescriptor::new(CHANNEL_READ_TYPE, ChannelReadInstruction::create)
            .with_metadata("channel", "Read a channel into a workspace variable"),
    )
}
