use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SequencerError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Procedure error: {0}")]
    Procedure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Fatal configuration problems found while setting a node up.
///
/// A node that failed setup is never executed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    #[error("Missing required attribute '{0}'")]
    MissingAttribute(String),

    #[error("Invalid value '{value}' for attribute '{name}': {reason}")]
    InvalidAttribute {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Could not parse type descriptor: {0}")]
    TypeParse(String),

    #[error("Could not parse value: {0}")]
    ValueParse(String),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Failures of a single instruction execution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Could not parse type descriptor: {0}")]
    TypeParse(String),

    #[error("Could not parse value: {0}")]
    ValueParse(String),

    #[error("Workspace variable '{0}' is not available")]
    UnavailableSource(String),

    #[error("Could not write workspace variable '{0}'")]
    WorkspaceWrite(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("Instruction was executed before a successful setup")]
    NotSetup,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Channel '{channel}' not connected within {}s", timeout.as_secs_f64())]
    ConnectTimeout { channel: String, timeout: Duration },

    #[error("Operation on channel '{channel}' timed out after {}s", timeout.as_secs_f64())]
    OperationTimeout { channel: String, timeout: Duration },

    #[error("Transport error on channel '{channel}': {reason}")]
    Transport { channel: String, reason: String },

    #[error("Type mismatch on channel '{channel}': expected {expected}, got {actual}")]
    TypeMismatch {
        channel: String,
        expected: String,
        actual: String,
    },

    #[error("Channel '{0}' is not connected")]
    NotConnected(String),

    #[error("Channel '{0}' is already hosted by this process")]
    AlreadyHosted(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Type '{type_name}' is already registered in the {registry} registry")]
    DuplicateRegistration { registry: String, type_name: String },

    #[error("Unknown {registry} type: {type_name}")]
    UnknownType { registry: String, type_name: String },
}
