use super::{ChannelConnection, ChannelTransport};
use crate::{ChannelError, TypeDescriptor, TypedValue, Value};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Notify;

static GLOBAL_HUB: Lazy<Arc<LocalChannelHub>> = Lazy::new(|| Arc::new(LocalChannelHub::new()));

/// In-process channel service.
///
/// Channels are hosted by [`ServerEndpoint`]s and reached through the
/// [`ChannelTransport`] implementation; a connect waits until the channel is
/// hosted.
pub struct LocalChannelHub {
    channels: RwLock<HashMap<String, Arc<HostedChannel>>>,
    hosted: Notify,
}

struct HostedChannel {
    name: String,
    ty: TypeDescriptor,
    value: RwLock<Option<Value>>,
    live: AtomicBool,
}

impl HostedChannel {
    fn get(&self) -> Option<TypedValue> {
        let value = self.value.read().unwrap_or_else(PoisonError::into_inner);
        value
            .as_ref()
            .and_then(|v| TypedValue::new(self.ty.clone(), v.clone()))
    }

    fn set(&self, value: &TypedValue) -> Result<(), ChannelError> {
        let converted = value
            .convert_to(&self.ty)
            .ok_or_else(|| ChannelError::TypeMismatch {
                channel: self.name.clone(),
                expected: self.ty.to_string(),
                actual: value.ty().to_string(),
            })?;
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(converted.into_value());
        Ok(())
    }
}

impl LocalChannelHub {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            hosted: Notify::new(),
        }
    }

    /// Hub shared by every node of this process.
    pub fn global() -> Arc<LocalChannelHub> {
        GLOBAL_HUB.clone()
    }

    /// Starts hosting `name`. The channel stays hosted until the returned
    /// endpoint is dropped.
    pub fn host(
        self: &Arc<Self>,
        name: &str,
        ty: TypeDescriptor,
        initial: Option<TypedValue>,
    ) -> Result<ServerEndpoint, ChannelError> {
        let channel = Arc::new(HostedChannel {
            name: name.to_string(),
            ty,
            value: RwLock::new(None),
            live: AtomicBool::new(true),
        });
        if let Some(value) = &initial {
            channel.set(value)?;
        }

        {
            let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
            if channels.contains_key(name) {
                return Err(ChannelError::AlreadyHosted(name.to_string()));
            }
            channels.insert(name.to_string(), channel.clone());
        }
        tracing::info!("Hosting channel '{}' ({})", name, channel.ty);
        self.hosted.notify_waiters();

        Ok(ServerEndpoint {
            hub: self.clone(),
            channel,
        })
    }

    pub fn is_hosted(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Current value of a hosted channel.
    pub fn current_value(&self, name: &str) -> Option<TypedValue> {
        self.lookup(name).and_then(|c| c.get())
    }

    fn lookup(&self, name: &str) -> Option<Arc<HostedChannel>> {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn unhost(&self, channel: &Arc<HostedChannel>) {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        if channels
            .get(&channel.name)
            .is_some_and(|hosted| Arc::ptr_eq(hosted, channel))
        {
            channels.remove(&channel.name);
            tracing::info!("Stopped hosting channel '{}'", channel.name);
        }
    }
}

impl Default for LocalChannelHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelTransport for LocalChannelHub {
    async fn connect(&self, channel: &str) -> Result<Box<dyn ChannelConnection>, ChannelError> {
        loop {
            let notified = self.hosted.notified();
            if let Some(hosted) = self.lookup(channel) {
                return Ok(Box::new(LocalConnection { channel: hosted }));
            }
            tracing::trace!("Waiting for channel '{}' to be hosted", channel);
            notified.await;
        }
    }
}

struct LocalConnection {
    channel: Arc<HostedChannel>,
}

impl LocalConnection {
    fn ensure_live(&self) -> Result<(), ChannelError> {
        if self.channel.live.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ChannelError::Transport {
                channel: self.channel.name.clone(),
                reason: "channel is no longer hosted".to_string(),
            })
        }
    }
}

#[async_trait]
impl ChannelConnection for LocalConnection {
    async fn write(&mut self, value: &TypedValue) -> Result<(), ChannelError> {
        self.ensure_live()?;
        self.channel.set(value)
    }

    async fn read(&mut self) -> Result<TypedValue, ChannelError> {
        self.ensure_live()?;
        self.channel.get().ok_or_else(|| ChannelError::Transport {
            channel: self.channel.name.clone(),
            reason: "channel has no value yet".to_string(),
        })
    }

    fn close(&mut self) {}
}

/// Ownership of one hosted channel; dropping it stops hosting.
pub struct ServerEndpoint {
    hub: Arc<LocalChannelHub>,
    channel: Arc<HostedChannel>,
}

impl ServerEndpoint {
    pub fn name(&self) -> &str {
        &self.channel.name
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.channel.ty
    }

    pub fn is_live(&self) -> bool {
        self.channel.live.load(Ordering::SeqCst)
    }

    pub fn get(&self) -> Option<TypedValue> {
        self.channel.get()
    }

    pub fn set(&self, value: &TypedValue) -> Result<(), ChannelError> {
        self.channel.set(value)
    }
}

impl Drop for ServerEndpoint {
    fn drop(&mut self) {
        self.channel.live.store(false, Ordering::SeqCst);
        self.hub.unhost(&self.channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelHandle, ScalarType};
    use std::time::Duration;

    fn bool_type() -> TypeDescriptor {
        TypeDescriptor::Scalar(ScalarType::Bool)
    }

    #[test]
    fn hosting_twice_is_refused() {
        let hub = Arc::new(LocalChannelHub::new());
        let _first = hub.host("PV:A", bool_type(), None).unwrap();
        assert!(matches!(
            hub.host("PV:A", bool_type(), None),
            Err(ChannelError::AlreadyHosted(_))
        ));
    }

    #[test]
    fn dropping_endpoint_unhosts() {
        let hub = Arc::new(LocalChannelHub::new());
        let endpoint = hub.host("PV:B", bool_type(), None).unwrap();
        assert!(hub.is_hosted("PV:B"));
        drop(endpoint);
        assert!(!hub.is_hosted("PV:B"));
        assert!(hub.host("PV:B", bool_type(), None).is_ok());
    }

    #[tokio::test]
    async fn connect_waits_for_hosting() {
        let hub = Arc::new(LocalChannelHub::new());
        let host_side = hub.clone();
        let server = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            host_side.host("PV:LATE", bool_type(), None)
        });

        let mut handle = ChannelHandle::new("PV:LATE");
        handle
            .connect(hub.as_ref(), Duration::from_secs(2))
            .await
            .unwrap();
        let _endpoint = server.await.unwrap().unwrap();

        let value = TypedValue::scalar(ScalarType::Bool, true).unwrap();
        handle.write(&value).await.unwrap();
        assert_eq!(hub.current_value("PV:LATE"), Some(value));
    }

    #[tokio::test]
    async fn write_converts_or_rejects() {
        let hub = Arc::new(LocalChannelHub::new());
        let _endpoint = hub
            .host("PV:F", TypeDescriptor::Scalar(ScalarType::Float64), None)
            .unwrap();
        let mut handle = ChannelHandle::new("PV:F");
        handle.connect(hub.as_ref(), Duration::from_secs(1)).await.unwrap();

        let int = TypedValue::scalar(ScalarType::Int32, 7i64).unwrap();
        handle.write(&int).await.unwrap();
        assert_eq!(
            hub.current_value("PV:F").map(|v| v.into_value()),
            Some(Value::Float(7.0))
        );

        let text = TypedValue::scalar(ScalarType::String, "seven").unwrap();
        assert!(matches!(
            handle.write(&text).await,
            Err(ChannelError::TypeMismatch { .. })
        ));
    }
}
