// crates/seqcore/src/channel/mod.rs
//! Process-variable channels as seen by plugin nodes.
//!
//! The channel service itself is opaque: nodes talk to it through
//! [`ChannelTransport`] and always wrap the resulting connection in a
//! [`ChannelHandle`], which bounds every wait and disconnects on drop.

mod handle;
mod local;

pub use handle::{ChannelHandle, ConnectionState, DEFAULT_CHANNEL_TIMEOUT};
pub use local::{LocalChannelHub, ServerEndpoint};

use crate::{ChannelError, TypedValue};
use async_trait::async_trait;

/// Entry point into a channel service.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Waits until `channel` is ready and returns an open connection.
    ///
    /// Callers bound the wait; implementations may wait indefinitely.
    async fn connect(&self, channel: &str) -> Result<Box<dyn ChannelConnection>, ChannelError>;
}

/// One open connection to a channel.
#[async_trait]
pub trait ChannelConnection: Send {
    async fn write(&mut self, value: &TypedValue) -> Result<(), ChannelError>;

    async fn read(&mut self) -> Result<TypedValue, ChannelError>;

    fn close(&mut self);
}
