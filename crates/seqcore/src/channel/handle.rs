use super::{ChannelConnection, ChannelTransport};
use crate::{ChannelError, TypedValue};
use std::time::Duration;
use tokio::time::Instant;

/// Bound applied to channel operations when a node does not configure one.
pub const DEFAULT_CHANNEL_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Scoped connection to a single channel.
///
/// `connect` starts a single budget: the connect and every later write or read
/// share one deadline, so a session never waits longer than the timeout it was
/// opened with. Channel-layer failures come back as [`ChannelError`], and the
/// connection is closed on drop if the owner did not call
/// [`ChannelHandle::disconnect`] itself.
pub struct ChannelHandle {
    channel: String,
    connection: Option<Box<dyn ChannelConnection>>,
    budget: Option<Budget>,
    last_error: Option<ChannelError>,
}

#[derive(Debug, Clone, Copy)]
struct Budget {
    deadline: Instant,
    timeout: Duration,
}

impl ChannelHandle {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            connection: None,
            budget: None,
            last_error: None,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn state(&self) -> ConnectionState {
        if self.connection.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Error of the last operation, `None` if it succeeded.
    pub fn last_error(&self) -> Option<&ChannelError> {
        self.last_error.as_ref()
    }

    /// Time left before the current session's deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.budget
            .map(|b| b.deadline.saturating_duration_since(Instant::now()))
    }

    /// Connects within `timeout`; whatever is left of it bounds the
    /// operations that follow.
    pub async fn connect(
        &mut self,
        transport: &dyn ChannelTransport,
        timeout: Duration,
    ) -> Result<(), ChannelError> {
        self.disconnect();
        let budget = Budget {
            deadline: Instant::now() + timeout,
            timeout,
        };
        self.budget = Some(budget);
        let outcome =
            tokio::time::timeout_at(budget.deadline, transport.connect(&self.channel)).await;
        let result = match outcome {
            Ok(Ok(connection)) => {
                tracing::debug!("Connected to channel '{}'", self.channel);
                self.connection = Some(connection);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ChannelError::ConnectTimeout {
                channel: self.channel.clone(),
                timeout,
            }),
        };
        self.record(result)
    }

    /// Writes `value`; only valid while connected.
    pub async fn write(&mut self, value: &TypedValue) -> Result<(), ChannelError> {
        let (connection, budget) = match (self.connection.as_mut(), self.budget) {
            (Some(connection), Some(budget)) => (connection, budget),
            _ => return self.record(Err(ChannelError::NotConnected(self.channel.clone()))),
        };
        let outcome = tokio::time::timeout_at(budget.deadline, connection.write(value)).await;
        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(ChannelError::OperationTimeout {
                channel: self.channel.clone(),
                timeout: budget.timeout,
            }),
        };
        self.record(result)
    }

    pub async fn read(&mut self) -> Result<TypedValue, ChannelError> {
        let (connection, budget) = match (self.connection.as_mut(), self.budget) {
            (Some(connection), Some(budget)) => (connection, budget),
            _ => {
                let err = ChannelError::NotConnected(self.channel.clone());
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };
        let outcome = tokio::time::timeout_at(budget.deadline, connection.read()).await;
        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(ChannelError::OperationTimeout {
                channel: self.channel.clone(),
                timeout: budget.timeout,
            }),
        };
        self.last_error = result.as_ref().err().cloned();
        result
    }

    /// Closes the connection. Safe to call in any state.
    pub fn disconnect(&mut self) {
        self.budget = None;
        if let Some(mut connection) = self.connection.take() {
            connection.close();
            tracing::debug!("Disconnected from channel '{}'", self.channel);
        }
    }

    fn record(&mut self, result: Result<(), ChannelError>) -> Result<(), ChannelError> {
        self.last_error = result.as_ref().err().cloned();
        result
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.disconnect();
    }
}
