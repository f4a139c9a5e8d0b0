//! Core abstractions for the sequencer plugins
//!
//! This crate provides the types and traits every other crate depends on:
//! typed values, attribute stores, the instruction/variable traits, the
//! workspace and user-interface seams, and the channel layer.

mod attributes;
pub mod channel;
mod error;
pub mod events;
mod node;
mod procedure;
pub mod resolver;
mod value;
mod workspace;

pub use attributes::AttributeStore;
pub use channel::{
    ChannelConnection, ChannelHandle, ChannelTransport, ConnectionState, LocalChannelHub,
    ServerEndpoint, DEFAULT_CHANNEL_TIMEOUT,
};
pub use error::{ChannelError, NodeError, RegistryError, SequencerError, SetupError};
pub use events::*;
pub use node::{ExecutionStatus, Instruction, Variable};
pub use procedure::{NodeSpec, Procedure};
pub use value::{ScalarType, TypeDescriptor, TypedValue, Value};
pub use workspace::{ProcedureWorkspace, Workspace};

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, SequencerError>;
