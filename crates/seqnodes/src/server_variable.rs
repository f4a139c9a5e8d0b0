use crate::util::{non_empty_attribute, CHANNEL_ATTRIBUTE};
use seqcore::resolver::{TYPE_ATTRIBUTE, VALUE_ATTRIBUTE};
use seqcore::{
    AttributeStore, LocalChannelHub, NodeError, RegistryError, ServerEndpoint, SetupError,
    TypeDescriptor, TypedValue, Variable,
};
use seqruntime::{NodeDescriptor, VariableRegistry};
use std::sync::Arc;

pub const SERVER_VARIABLE_TYPE: &str = "ServerVariable";

/// Variable that hosts its own channel for the lifetime of a run.
///
/// Setup starts hosting `channel` with the given `type` (and optional initial
/// `value`); reads and writes go straight to the hosted value. The endpoint is
/// released by `reset` or when the variable is dropped.
pub struct ServerVariable {
    attributes: AttributeStore,
    hub: Arc<LocalChannelHub>,
    endpoint: Option<ServerEndpoint>,
}

impl ServerVariable {
    pub fn new() -> Self {
        Self::with_hub(LocalChannelHub::global())
    }

    pub fn with_hub(hub: Arc<LocalChannelHub>) -> Self {
        Self {
            attributes: AttributeStore::new(),
            hub,
            endpoint: None,
        }
    }

    fn create() -> Box<dyn Variable> {
        Box::new(Self::new())
    }

    /// Name of the hosted channel, while hosting.
    pub fn channel(&self) -> Option<&str> {
        self.endpoint.as_ref().map(|e| e.name())
    }
}

impl Default for ServerVariable {
    fn default() -> Self {
        Self::new()
    }
}

impl Variable for ServerVariable {
    fn variable_type(&self) -> &str {
        SERVER_VARIABLE_TYPE
    }

    fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        self.endpoint = None;

        let channel = non_empty_attribute(&self.attributes, CHANNEL_ATTRIBUTE)?;
        let ty = TypeDescriptor::parse(self.attributes.require(TYPE_ATTRIBUTE)?)
            .map_err(SetupError::TypeParse)?;
        let initial = self
            .attributes
            .get(VALUE_ATTRIBUTE)
            .map(|text| TypedValue::parse(ty.clone(), text))
            .transpose()
            .map_err(SetupError::ValueParse)?;

        let endpoint = self.hub.host(channel, ty, initial)?;
        self.endpoint = Some(endpoint);
        Ok(())
    }

    fn get_value(&self) -> Option<TypedValue> {
        self.endpoint.as_ref()?.get()
    }

    fn set_value(&self, value: TypedValue) -> Result<(), NodeError> {
        let endpoint = self.endpoint.as_ref().ok_or_else(|| {
            NodeError::UnavailableSource(
                self.attributes
                    .get(CHANNEL_ATTRIBUTE)
                    .unwrap_or(SERVER_VARIABLE_TYPE)
                    .to_string(),
            )
        })?;
        endpoint.set(&value)?;
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.endpoint
            .as_ref()
            .is_some_and(|e| e.is_live() && e.get().is_some())
    }

    fn reset(&mut self) {
        if let Some(endpoint) = self.endpoint.take() {
            tracing::debug!("Releasing hosted channel '{}'", endpoint.name());
        }
    }
}

pub fn register(registry: &VariableRegistry) -> Result<(), RegistryError> {
    registry.register(
        NodeDescriptor::new(SERVER_VARIABLE_TYPE, ServerVariable::create)
            .with_metadata("channel", "Host a channel whose value lives in this variable"),
    )
}
