//! In-process capture runtime.
//!
//! [`MemoryRuntime`] implements [`CaptureRuntime`] without any hardware.
//! The owner plugs and removes simulated devices, seeds property values and
//! injects failures, then drives a [`Session`](crate::Session) exactly as a
//! real runtime would: arrivals on the root connection, removals on the
//! device's own connection, one event stream per open.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::channel::{CaptureRuntime, ConnectionHandle, PropertyChannel};
use crate::error::{Error, Result, ResultCode};
use crate::event::CaptureEvent;
use crate::property::{PropertyId, PropertyValue};
use crate::types::{AppInfo, DeviceInfo, Version};

/// Version reported by the memory runtime's root connection.
pub const MEMORY_RUNTIME_VERSION: Version = Version::new(1, 0, 0, 0);

/// Open and close counters kept by a [`MemoryRuntime`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Root connections opened.
    pub root_opens: usize,
    /// Root connections closed.
    pub root_closes: usize,
    /// Device (and device manager) connections opened.
    pub device_opens: usize,
    /// Device (and device manager) connections closed.
    pub device_closes: usize,
}

type PropertyKey = (ConnectionHandle, PropertyId);

#[derive(Default)]
struct State {
    events: Option<mpsc::Sender<CaptureEvent>>,
    stats: RuntimeStats,
    fail_next_open: Option<ResultCode>,
    fail_next_close: Option<ResultCode>,
    plugged: HashMap<String, (ConnectionHandle, DeviceInfo)>,
    open_failures: HashMap<String, ResultCode>,
    close_failures: HashMap<ConnectionHandle, ResultCode>,
    properties: HashMap<PropertyKey, std::result::Result<PropertyValue, ResultCode>>,
    arguments: HashMap<PropertyKey, PropertyValue>,
    open: HashSet<ConnectionHandle>,
}

struct Inner {
    root: ConnectionHandle,
    next_handle: AtomicU64,
    state: Mutex<State>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocate(&self) -> ConnectionHandle {
        ConnectionHandle::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }
}

/// A capture runtime simulated in memory.
///
/// Cloning yields another handle to the same runtime.
#[derive(Clone)]
pub struct MemoryRuntime {
    inner: Arc<Inner>,
}

impl MemoryRuntime {
    /// Creates a runtime with no devices plugged in.
    #[must_use]
    pub fn new() -> Self {
        let root = ConnectionHandle::from_raw(1);
        let mut state = State::default();
        state.properties.insert(
            (root, PropertyId::Version),
            Ok(PropertyValue::Version(MEMORY_RUNTIME_VERSION)),
        );
        Self {
            inner: Arc::new(Inner {
                root,
                next_handle: AtomicU64::new(2),
                state: Mutex::new(state),
            }),
        }
    }

    /// Returns the handle the root connection uses.
    #[must_use]
    pub fn root_handle(&self) -> ConnectionHandle {
        self.inner.root
    }

    /// Returns the open and close counters.
    #[must_use]
    pub fn stats(&self) -> RuntimeStats {
        self.inner.state().stats
    }

    /// Returns true while the connection named by `handle` is open.
    #[must_use]
    pub fn is_open(&self, handle: ConnectionHandle) -> bool {
        self.inner.state().open.contains(&handle)
    }

    /// Makes the next root open fail with `code`.
    pub fn fail_next_open(&self, code: ResultCode) {
        self.inner.state().fail_next_open = Some(code);
    }

    /// Makes the next root close report `code`. The connection still closes.
    pub fn fail_next_close(&self, code: ResultCode) {
        self.inner.state().fail_next_close = Some(code);
    }

    /// Makes opening the device with `guid` fail with `code`.
    pub fn fail_device_open(&self, guid: impl Into<String>, code: ResultCode) {
        self.inner.state().open_failures.insert(guid.into(), code);
    }

    /// Makes closing the device connection `handle` report `code`.
    pub fn fail_device_close(&self, handle: ConnectionHandle, code: ResultCode) {
        self.inner.state().close_failures.insert(handle, code);
    }

    /// Plugs a device in without announcing it.
    ///
    /// Returns the handle its connection will carry once opened.
    pub fn plug(&self, info: DeviceInfo) -> ConnectionHandle {
        let handle = self.inner.allocate();
        self.inner
            .state()
            .plugged
            .insert(info.guid.clone(), (handle, info));
        handle
    }

    /// Plugs a device in and announces its arrival on the root connection.
    pub async fn arrive(&self, info: DeviceInfo) -> Result<ConnectionHandle> {
        let handle = self.plug(info.clone());
        self.emit(CaptureEvent::arrival(self.inner.root, info)).await?;
        Ok(handle)
    }

    /// Unplugs a device and announces its removal on its own connection.
    pub async fn remove(&self, handle: ConnectionHandle) -> Result<()> {
        let info = {
            let mut state = self.inner.state();
            let guid = state
                .plugged
                .iter()
                .find(|(_, (h, _))| *h == handle)
                .map(|(guid, _)| guid.clone())
                .ok_or(Error::InvalidHandle)?;
            state.plugged.remove(&guid).map(|(_, info)| info)
        };
        let event = match info {
            Some(info) if info.device_type.is_device_manager() => {
                CaptureEvent::device_manager_removal(handle)
            }
            _ => CaptureEvent::device_removal(handle),
        };
        self.emit(event).await
    }

    /// Sends an event on the open root connection's stream.
    pub async fn emit(&self, event: CaptureEvent) -> Result<()> {
        let events = self.inner.state().events.clone();
        let Some(events) = events else {
            return Err(Error::ChannelClosed);
        };
        tracing::trace!(kind = ?event.kind, origin = %event.origin, "emitting event");
        events.send(event).await.map_err(|_| Error::ChannelClosed)
    }

    /// Seeds the value returned when `id` is read on `handle`.
    pub fn seed_property(&self, handle: ConnectionHandle, id: PropertyId, value: PropertyValue) {
        self.inner.state().properties.insert((handle, id), Ok(value));
    }

    /// Makes every get or set of `id` on `handle` fail with `code`.
    pub fn fail_property(&self, handle: ConnectionHandle, id: PropertyId, code: ResultCode) {
        self.inner.state().properties.insert((handle, id), Err(code));
    }

    /// Returns the value last set (or seeded) for `id` on `handle`.
    #[must_use]
    pub fn property(&self, handle: ConnectionHandle, id: PropertyId) -> Option<PropertyValue> {
        match self.inner.state().properties.get(&(handle, id)) {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns the argument of the last get of `id` on `handle`.
    #[must_use]
    pub fn last_argument(&self, handle: ConnectionHandle, id: PropertyId) -> Option<PropertyValue> {
        self.inner.state().arguments.get(&(handle, id)).cloned()
    }
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRuntime")
            .field("root", &self.inner.root)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl CaptureRuntime for MemoryRuntime {
    fn open(
        &self,
        app: AppInfo,
        events: mpsc::Sender<CaptureEvent>,
    ) -> BoxFuture<'_, Result<Arc<dyn PropertyChannel>>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let mut state = self.inner.state();
            if let Some(code) = state.fail_next_open.take() {
                tracing::debug!(%code, "memory runtime refusing open");
                return Err(Error::from(code));
            }
            if state.events.is_some() {
                tracing::warn!("memory runtime opened twice, replacing event stream");
            }
            tracing::debug!(bundle = %app.bundle_id, "memory runtime opened");
            state.events = Some(events);
            state.stats.root_opens += 1;
            state.open.insert(self.inner.root);
            let channel: Arc<dyn PropertyChannel> = Arc::new(MemoryChannel {
                handle: self.inner.root,
                inner: Arc::clone(&self.inner),
            });
            Ok(channel)
        })
    }
}

/// One connection opened on a [`MemoryRuntime`].
struct MemoryChannel {
    handle: ConnectionHandle,
    inner: Arc<Inner>,
}

impl MemoryChannel {
    fn ensure_open(&self, state: &State) -> Result<()> {
        if state.open.contains(&self.handle) {
            Ok(())
        } else {
            Err(Error::InvalidHandle)
        }
    }
}

impl PropertyChannel for MemoryChannel {
    fn handle(&self) -> ConnectionHandle {
        self.handle
    }

    fn get_property(
        &self,
        id: PropertyId,
        arg: PropertyValue,
    ) -> BoxFuture<'_, Result<PropertyValue>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let mut state = self.inner.state();
            self.ensure_open(&state)?;
            state.arguments.insert((self.handle, id), arg);
            match state.properties.get(&(self.handle, id)) {
                Some(Ok(value)) => Ok(value.clone()),
                Some(Err(code)) => Err(Error::from(*code)),
                None => Err(Error::Capture(ResultCode::NotSupported)),
            }
        })
    }

    fn set_property(&self, id: PropertyId, value: PropertyValue) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let mut state = self.inner.state();
            self.ensure_open(&state)?;
            if let Some(Err(code)) = state.properties.get(&(self.handle, id)) {
                return Err(Error::from(*code));
            }
            state.properties.insert((self.handle, id), Ok(value));
            Ok(())
        })
    }

    fn open_device(&self, guid: String) -> BoxFuture<'_, Result<Arc<dyn PropertyChannel>>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let mut state = self.inner.state();
            self.ensure_open(&state)?;
            if self.handle != self.inner.root {
                return Err(Error::Capture(ResultCode::NotSupported));
            }
            if let Some(code) = state.open_failures.get(&guid) {
                return Err(Error::from(*code));
            }
            let Some((handle, _)) = state.plugged.get(&guid) else {
                return Err(Error::Capture(ResultCode::Failure));
            };
            let handle = *handle;
            state.open.insert(handle);
            state.stats.device_opens += 1;
            let channel: Arc<dyn PropertyChannel> = Arc::new(MemoryChannel {
                handle,
                inner: Arc::clone(&self.inner),
            });
            Ok(channel)
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let mut state = self.inner.state();
            if !state.open.remove(&self.handle) {
                return Err(Error::InvalidHandle);
            }
            let code = if self.handle == self.inner.root {
                state.events = None;
                state.stats.root_closes += 1;
                state.fail_next_close.take()
            } else {
                state.stats.device_closes += 1;
                state.close_failures.get(&self.handle).copied()
            };
            code.map_or(Ok(()), ResultCode::into_result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::types::DeviceType;

    fn app() -> AppInfo {
        AppInfo::new("dev", "com.example.app", "key")
    }

    #[tokio::test]
    async fn test_open_close_counts() {
        let runtime = MemoryRuntime::new();
        let (tx, _rx) = mpsc::channel(8);

        let root = runtime.open(app(), tx).await.unwrap();
        assert_eq!(root.handle(), runtime.root_handle());
        assert!(runtime.is_open(root.handle()));

        root.close().await.unwrap();
        assert!(!runtime.is_open(root.handle()));
        assert_eq!(
            runtime.stats(),
            RuntimeStats {
                root_opens: 1,
                root_closes: 1,
                ..RuntimeStats::default()
            }
        );
    }

    #[tokio::test]
    async fn test_fail_next_open_is_one_shot() {
        let runtime = MemoryRuntime::new();
        runtime.fail_next_open(ResultCode::Timeout);

        let (tx, _rx) = mpsc::channel(8);
        let err = runtime.open(app(), tx.clone()).await.unwrap_err();
        assert_eq!(err.code(), ResultCode::Timeout);
        assert!(runtime.open(app(), tx).await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_channel_rejects_operations() {
        let runtime = MemoryRuntime::new();
        let (tx, _rx) = mpsc::channel(8);
        let root = runtime.open(app(), tx).await.unwrap();
        root.close().await.unwrap();

        let err = root
            .get_property(PropertyId::Version, PropertyValue::None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidHandle));
        assert!(matches!(root.close().await, Err(Error::InvalidHandle)));
    }

    #[tokio::test]
    async fn test_arrival_and_device_open() {
        let runtime = MemoryRuntime::new();
        let (tx, mut rx) = mpsc::channel(8);
        let root = runtime.open(app(), tx).await.unwrap();

        let info = DeviceInfo::new("Scanner", "guid-1", DeviceType::SCANNER_D750);
        let handle = runtime.arrive(info.clone()).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::DeviceArrival);
        assert_eq!(event.origin, runtime.root_handle());

        let device = root.open_device("guid-1".into()).await.unwrap();
        assert_eq!(device.handle(), handle);
        assert_eq!(runtime.stats().device_opens, 1);

        let err = device.open_device("guid-1".into()).await.unwrap_err();
        assert_eq!(err.code(), ResultCode::NotSupported);

        runtime.remove(handle).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::DeviceRemoval);
        assert_eq!(event.origin, handle);
    }

    #[tokio::test]
    async fn test_device_close_failure_still_closes() {
        let runtime = MemoryRuntime::new();
        let (tx, _rx) = mpsc::channel(8);
        let root = runtime.open(app(), tx).await.unwrap();
        let handle = runtime.plug(DeviceInfo::new("S", "g", DeviceType::SCANNER_7));
        runtime.fail_device_close(handle, ResultCode::Failure);

        let device = root.open_device("g".into()).await.unwrap();
        assert!(device.close().await.is_err());
        assert!(!runtime.is_open(handle));
        assert_eq!(runtime.stats().device_closes, 1);
    }

    #[tokio::test]
    async fn test_properties() {
        let runtime = MemoryRuntime::new();
        let (tx, _rx) = mpsc::channel(8);
        let root = runtime.open(app(), tx).await.unwrap();

        let version = root
            .get_property(PropertyId::Version, PropertyValue::None)
            .await
            .unwrap();
        assert_eq!(version, PropertyValue::Version(MEMORY_RUNTIME_VERSION));

        let err = root
            .get_property(PropertyId::SoftScanStatus, PropertyValue::Byte(1))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ResultCode::NotSupported);
        assert_eq!(
            runtime.last_argument(root.handle(), PropertyId::SoftScanStatus),
            Some(PropertyValue::Byte(1))
        );

        root.set_property(PropertyId::DataConfirmationMode, PropertyValue::Byte(2))
            .await
            .unwrap();
        assert_eq!(
            runtime.property(root.handle(), PropertyId::DataConfirmationMode),
            Some(PropertyValue::Byte(2))
        );

        runtime.fail_property(root.handle(), PropertyId::DataConfirmationMode, ResultCode::Failure);
        assert!(root
            .set_property(PropertyId::DataConfirmationMode, PropertyValue::Byte(1))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_emit_without_open_fails() {
        let runtime = MemoryRuntime::new();
        let err = runtime
            .emit(CaptureEvent::error(runtime.root_handle(), ResultCode::Failure))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ChannelClosed));
    }
}
