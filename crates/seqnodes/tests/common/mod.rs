#![allow(dead_code)]

use async_trait::async_trait;
use seqcore::{
    ChannelConnection, ChannelError, ChannelTransport, ProcedureWorkspace, TypeDescriptor,
    TypedValue, UiMessage, UserInterface, Variable,
};
use seqnodes::LocalVariable;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// User interface that keeps everything reported to it
#[derive(Default)]
pub struct RecordingUi {
    messages: Mutex<Vec<UiMessage>>,
}

impl RecordingUi {
    pub fn failures(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                UiMessage::Failure { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                UiMessage::Info { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

impl UserInterface for RecordingUi {
    fn report_message(&self, message: &str) {
        self.messages.lock().unwrap().push(UiMessage::Info {
            message: message.to_string(),
        });
    }

    fn report_failure(&self, message: &str) {
        self.messages.lock().unwrap().push(UiMessage::Failure {
            message: message.to_string(),
        });
    }
}

/// Workspace holding `Local` variables built from (name, type json, value).
pub fn workspace_with(entries: &[(&str, &str, Option<&str>)]) -> ProcedureWorkspace {
    let mut workspace = ProcedureWorkspace::new();
    for (name, ty, value) in entries {
        let mut var = LocalVariable::new();
        var.attributes_mut().set("type", *ty);
        if let Some(value) = value {
            var.attributes_mut().set("value", *value);
        }
        assert!(workspace.add_variable(*name, Box::new(var)));
    }
    workspace.setup().unwrap();
    workspace
}

#[derive(Default)]
pub struct TransportState {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub written: Mutex<Vec<TypedValue>>,
}

impl TransportState {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn last_written(&self) -> Option<TypedValue> {
        self.written.lock().unwrap().last().cloned()
    }
}

/// Channel transport double that counts connections.
///
/// Only `reachable` channels ever connect; writes must match `accepts`.
pub struct CountingTransport {
    pub state: Arc<TransportState>,
    reachable: Vec<String>,
    accepts: TypeDescriptor,
    connect_delay: Duration,
    hang: bool,
}

impl CountingTransport {
    pub fn new(reachable: &[&str], accepts: TypeDescriptor) -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(TransportState::default()),
            reachable: reachable.iter().map(|s| s.to_string()).collect(),
            accepts,
            connect_delay: Duration::ZERO,
            hang: false,
        })
    }

    /// Connects to anything after `connect_delay`; writes and reads never finish.
    pub fn laggy(connect_delay: Duration, accepts: TypeDescriptor) -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(TransportState::default()),
            reachable: Vec::new(),
            accepts,
            connect_delay,
            hang: true,
        })
    }
}

#[async_trait]
impl ChannelTransport for CountingTransport {
    async fn connect(&self, channel: &str) -> Result<Box<dyn ChannelConnection>, ChannelError> {
        if self.hang {
            tokio::time::sleep(self.connect_delay).await;
        } else if !self.reachable.iter().any(|c| c == channel) {
            std::future::pending::<()>().await;
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingConnection {
            channel: channel.to_string(),
            state: self.state.clone(),
            accepts: self.accepts.clone(),
            hang: self.hang,
        }))
    }
}

struct CountingConnection {
    channel: String,
    state: Arc<TransportState>,
    accepts: TypeDescriptor,
    hang: bool,
}

#[async_trait]
impl ChannelConnection for CountingConnection {
    async fn write(&mut self, value: &TypedValue) -> Result<(), ChannelError> {
        if self.hang {
            return std::future::pending().await;
        }
        if value.ty() != &self.accepts {
            return Err(ChannelError::TypeMismatch {
                channel: self.channel.clone(),
                expected: self.accepts.to_string(),
                actual: value.ty().to_string(),
            });
        }
        self.state.written.lock().unwrap().push(value.clone());
        Ok(())
    }

    async fn read(&mut self) -> Result<TypedValue, ChannelError> {
        if self.hang {
            return std::future::pending().await;
        }
        self.state
            .last_written()
            .ok_or_else(|| ChannelError::Transport {
                channel: self.channel.clone(),
                reason: "nothing written".to_string(),
            })
    }

    fn close(&mut self) {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}
