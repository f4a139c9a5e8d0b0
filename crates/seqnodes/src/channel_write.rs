use crate::util::{non_empty_attribute, report_outcome, timeout_attribute, CHANNEL_ATTRIBUTE};
use async_trait::async_trait;
use seqcore::resolver::{self, ValueSource, TYPE_ATTRIBUTE, VALUE_ATTRIBUTE, VAR_NAME_ATTRIBUTE};
use seqcore::{
    AttributeStore, ChannelHandle, ChannelTransport, ExecutionStatus, Instruction,
    LocalChannelHub, NodeError, RegistryError, SetupError, TypedValue, UserInterface, Workspace,
    DEFAULT_CHANNEL_TIMEOUT,
};
use seqruntime::{InstructionRegistry, NodeDescriptor};
use std::sync::Arc;
use std::time::Duration;

pub const CHANNEL_WRITE_TYPE: &str = "ChannelWrite";

/// Writes a value to a channel, bounded by a timeout.
///
/// The value comes from the workspace variable named by `varName`, or from the
/// `type`/`value` literal when `varName` is absent. Each execution opens its
/// own channel handle and closes it before returning, whatever the outcome.
/// Nothing is retried.
pub struct ChannelWriteInstruction {
    attributes: AttributeStore,
    transport: Arc<dyn ChannelTransport>,
    config: Option<WriteConfig>,
}

/// Attributes validated by `setup`.
#[derive(Debug, Clone)]
struct WriteConfig {
    channel: String,
    timeout: Duration,
}

impl ChannelWriteInstruction {
    /// Instruction writing through the process-wide local channel hub
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

    /// Timeout in effect after setup.
    pub fn timeout(&self) -> Option<Duration> {
        self.config.as_ref().map(|c| c.timeout)
    }

    async fn write_once(&self, workspace: &dyn Workspace) -> Result<String, NodeError> {
        let config = self.config.as_ref().ok_or(NodeError::NotSetup)?;

        tracing::debug!(channel = %config.channel, "resolving value");
        let value: TypedValue = resolver::resolve(&self.attributes, workspace)?;

        // Connect and write share the one timeout budget.
        tracing::debug!(channel = %config.channel, timeout = ?config.timeout, "connecting");
        let mut handle = ChannelHandle::new(config.channel.as_str());
        handle
            .connect(self.transport.as_ref(), config.timeout)
            .await?;

        tracing::debug!(channel = %config.channel, %value, "writing");
        let written = handle.write(&value).await;
        handle.disconnect();
        written?;

        Ok(format!("Wrote {} to channel '{}'", value, config.channel))
    }
}

impl Default for ChannelWriteInstruction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Instruction for ChannelWriteInstruction {
    fn instruction_type(&self) -> &str {
        CHANNEL_WRITE_TYPE
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
        if ValueSource::select(&self.attributes).is_none() {
            return Err(SetupError::Configuration(format!(
                "{} requires either '{}' or both '{}' and '{}'",
                CHANNEL_WRITE_TYPE, VAR_NAME_ATTRIBUTE, TYPE_ATTRIBUTE, VALUE_ATTRIBUTE
            )));
        }
        let timeout = timeout_attribute(&self.attributes, DEFAULT_CHANNEL_TIMEOUT)?;

        self.config = Some(WriteConfig { channel, timeout });
        Ok(())
    }

    async fn execute(&self, ui: &dyn UserInterface, workspace: &dyn Workspace) -> ExecutionStatus {
        let context = match &self.config {
            Some(config) => format!("{} to '{}' failed", CHANNEL_WRITE_TYPE, config.channel),
            None => format!("{} failed", CHANNEL_WRITE_TYPE),
        };
        report_outcome(ui, &context, self.write_once(workspace).await)
    }
}

pub fn register(registry: &InstructionRegistry) -> Result<(), RegistryError> {
    registry.register(
        NodeDescriptor::new(CHANNEL_WRITE_TYPE, ChannelWriteInstruction::create)
            .with_metadata("channel", "Write a workspace or literal value to a channel"),
    )
}
