//! Devices and device managers.
//!
//! A [`Device`] wraps one opened [`PropertyChannel`] and exposes it through
//! the property accessor table:
//!
//! ```no_run
//! # async fn demo(device: capture_session::Device) -> capture_session::Result<()> {
//! use capture_session::property::table;
//!
//! let name = device.get(&table::FRIENDLY_NAME).await?;
//! device.set(&table::FRIENDLY_NAME, format!("{name} (bay 2)")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Devices are created by the session when the runtime announces an
//! arrival and closed when it announces the removal. Every accessor on a
//! closed device fails with [`Error::InvalidHandle`].

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::channel::{ConnectionHandle, PropertyChannel};
use crate::error::{Error, Result};
use crate::event::DeliveryContext;
use crate::property::table::{self, Property};
use crate::types::{DeviceInfo, DeviceType};

struct Inner {
    info: DeviceInfo,
    channel: Arc<dyn PropertyChannel>,
    completion: DeliveryContext,
    closed: AtomicBool,
}

/// A connected capture device.
///
/// Cheap to clone; clones share the same connection.
#[derive(Clone)]
pub struct Device {
    inner: Arc<Inner>,
}

impl Device {
    /// Wraps an opened channel.
    ///
    /// Callback-style accessors complete on `completion`.
    #[must_use]
    pub fn new(
        info: DeviceInfo,
        channel: Arc<dyn PropertyChannel>,
        completion: DeliveryContext,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                info,
                channel,
                completion,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Connection handle.
    #[must_use]
    pub fn handle(&self) -> ConnectionHandle {
        self.inner.channel.handle()
    }

    /// Identity reported at arrival.
    #[must_use]
    pub fn info(&self) -> &DeviceInfo {
        &self.inner.info
    }

    /// Friendly name reported at arrival.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.info.name
    }

    /// GUID reported at arrival.
    #[must_use]
    pub fn guid(&self) -> &str {
        &self.inner.info.guid
    }

    /// Device type reported at arrival.
    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.inner.info.device_type
    }

    /// Returns true once the device's channel has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    fn channel(&self) -> Result<&dyn PropertyChannel> {
        if self.is_closed() {
            Err(Error::InvalidHandle)
        } else {
            Ok(self.inner.channel.as_ref())
        }
    }

    /// Turns a completion that raced a close into `InvalidHandle`.
    fn settle<T>(&self, result: Result<T>) -> Result<T> {
        if self.is_closed() {
            Err(Error::InvalidHandle)
        } else {
            result
        }
    }

    /// Reads a property.
    pub async fn get<I, O>(&self, property: &Property<I, O>) -> Result<O> {
        let result = table::get(self.channel()?, property).await;
        self.settle(result)
    }

    /// Reads a property that takes a query argument.
    pub async fn query<I, O>(&self, property: &Property<I, O>, input: I) -> Result<O> {
        let result = table::query(self.channel()?, property, input).await;
        self.settle(result)
    }

    /// Writes a property.
    pub async fn set<I, O>(&self, property: &Property<I, O>, input: I) -> Result<()> {
        let result = table::set(self.channel()?, property, input).await;
        self.settle(result)
    }

    /// Reads a property and hands the result to `callback` on the device's
    /// completion context.
    ///
    /// Must be called from within a tokio runtime.
    pub fn get_with<I, O, F>(&self, property: Property<I, O>, callback: F)
    where
        I: 'static,
        O: Send + 'static,
        F: FnOnce(Result<O>) + Send + 'static,
    {
        let device = self.clone();
        tokio::spawn(async move {
            let result = device.get(&property).await;
            device.inner.completion.deliver(move || callback(result));
        });
    }

    /// Writes a property and hands the outcome to `callback` on the device's
    /// completion context.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_with<I, O, F>(&self, property: Property<I, O>, input: I, callback: F)
    where
        I: Send + 'static,
        O: 'static,
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let device = self.clone();
        tokio::spawn(async move {
            let result = device.set(&property, input).await;
            device.inner.completion.deliver(move || callback(result));
        });
    }

    /// Marks the device closed and closes its channel.
    ///
    /// Closing twice only closes the channel once.
    pub(crate) async fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.inner.channel.close().await
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Device {}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("handle", &self.handle())
            .field("name", &self.name())
            .field("guid", &self.guid())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A connected device manager (e.g. a BLE scanner hub).
///
/// Dereferences to [`Device`] for the shared accessors and adds discovery.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceManager(Device);

impl DeviceManager {
    /// Wraps an opened channel.
    #[must_use]
    pub fn new(
        info: DeviceInfo,
        channel: Arc<dyn PropertyChannel>,
        completion: DeliveryContext,
    ) -> Self {
        Self(Device::new(info, channel, completion))
    }

    /// Starts a discovery that lasts at most `timeout`.
    ///
    /// Results arrive as discovered and discovery-end notifications.
    pub async fn start_discovery(&self, timeout: Duration) -> Result<()> {
        tracing::debug!(manager = %self.handle(), ?timeout, "starting discovery");
        self.set(&table::START_DISCOVERY, timeout).await
    }

    /// Favorite devices, a comma separated list of identifiers.
    pub async fn favorites(&self) -> Result<String> {
        self.get(&table::FAVORITES).await
    }

    /// Replaces the favorite devices.
    pub async fn set_favorites(&self, favorites: impl Into<String>) -> Result<()> {
        self.set(&table::FAVORITES, favorites.into()).await
    }

    /// Looks up the unique identifier of the device with `guid`.
    pub async fn unique_identifier(&self, guid: impl Into<String>) -> Result<String> {
        self.query(&table::UNIQUE_DEVICE_IDENTIFIER, guid.into())
            .await
    }

    /// The underlying device.
    #[must_use]
    pub const fn as_device(&self) -> &Device {
        &self.0
    }
}

impl Deref for DeviceManager {
    type Target = Device;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for DeviceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeviceManager").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{CaptureRuntime, MemoryRuntime};
    use crate::error::ResultCode;
    use crate::property::{PropertyId, PropertyValue};
    use crate::types::{AppInfo, BatteryLevel, DataSource, DataSourceStatus, Trigger};
    use tokio::sync::{mpsc, oneshot};

    async fn open_device(
        runtime: &MemoryRuntime,
        info: DeviceInfo,
        completion: DeliveryContext,
    ) -> (Arc<dyn PropertyChannel>, Device) {
        let (tx, _events) = mpsc::channel(8);
        let root = runtime
            .open(AppInfo::new("dev", "bundle", "key"), tx)
            .await
            .unwrap();
        let guid = info.guid.clone();
        runtime.plug(info.clone());
        let channel = root.open_device(guid).await.unwrap();
        (root, Device::new(info, channel, completion))
    }

    #[tokio::test]
    async fn test_get_and_set_through_table() {
        let runtime = MemoryRuntime::new();
        let info = DeviceInfo::new("Scanner", "g1", DeviceType::SCANNER_D750);
        let (_root, device) = open_device(&runtime, info, DeliveryContext::Inline).await;

        runtime.seed_property(
            device.handle(),
            PropertyId::BatteryLevelDevice,
            PropertyValue::ULong(64),
        );
        assert_eq!(
            device.get(&table::BATTERY_LEVEL).await.unwrap(),
            BatteryLevel::from_raw(64)
        );

        device
            .set(&table::FRIENDLY_NAME, "Bay 2".to_string())
            .await
            .unwrap();
        assert_eq!(device.get(&table::FRIENDLY_NAME).await.unwrap(), "Bay 2");

        device.set(&table::TRIGGER, Trigger::Start).await.unwrap();
        assert_eq!(
            runtime.property(device.handle(), PropertyId::TriggerDevice),
            Some(PropertyValue::Byte(1))
        );
    }

    #[tokio::test]
    async fn test_query_passes_argument() {
        let runtime = MemoryRuntime::new();
        let info = DeviceInfo::new("Scanner", "g1", DeviceType::SCANNER_D750);
        let (_root, device) = open_device(&runtime, info, DeliveryContext::Inline).await;

        let mut reply = DataSource::new(3, DataSourceStatus::Enabled);
        reply.name = "Code 128".into();
        runtime.seed_property(
            device.handle(),
            PropertyId::DataSourceDevice,
            PropertyValue::DataSource(reply.clone()),
        );

        let request = DataSource::new(3, DataSourceStatus::Disabled);
        let answer = device
            .query(&table::DATA_SOURCE, request.clone())
            .await
            .unwrap();
        assert_eq!(answer, reply);
        assert_eq!(
            runtime.last_argument(device.handle(), PropertyId::DataSourceDevice),
            Some(PropertyValue::DataSource(request))
        );
    }

    #[tokio::test]
    async fn test_runtime_errors_and_mismatches() {
        let runtime = MemoryRuntime::new();
        let info = DeviceInfo::new("Scanner", "g1", DeviceType::SCANNER_D750);
        let (_root, device) = open_device(&runtime, info, DeliveryContext::Inline).await;

        let err = device.get(&table::STAND_CONFIG).await.unwrap_err();
        assert_eq!(err.code(), ResultCode::NotSupported);

        runtime.seed_property(
            device.handle(),
            PropertyId::PowerStateDevice,
            PropertyValue::String("ac".into()),
        );
        let err = device.get(&table::POWER_STATE).await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedValue { .. }));
    }

    #[tokio::test]
    async fn test_closed_device_rejects_accessors() {
        let runtime = MemoryRuntime::new();
        let info = DeviceInfo::new("Scanner", "g1", DeviceType::SCANNER_D750);
        let (_root, device) = open_device(&runtime, info, DeliveryContext::Inline).await;

        device.close().await.unwrap();
        assert!(device.is_closed());
        assert!(!runtime.is_open(device.handle()));

        let err = device.get(&table::FRIENDLY_NAME).await.unwrap_err();
        assert!(matches!(err, Error::InvalidHandle));

        // second close does not reach the runtime
        device.close().await.unwrap();
        assert_eq!(runtime.stats().device_closes, 1);
    }

    #[tokio::test]
    async fn test_callback_accessors_complete_on_context() {
        let runtime = MemoryRuntime::new();
        let (completion, mut queue) = DeliveryContext::queued();
        let info = DeviceInfo::new("Scanner", "g1", DeviceType::SCANNER_D750);
        let (_root, device) = open_device(&runtime, info, completion).await;

        let (tx, rx) = oneshot::channel();
        device.set_with(table::PREAMBLE, "#".to_string(), move |result| {
            let _ = tx.send(result.is_ok());
        });

        // nothing runs until the queue is drained
        assert!(queue.run_next().await);
        assert!(rx.await.unwrap());
        assert_eq!(
            runtime.property(device.handle(), PropertyId::PreambleDevice),
            Some(PropertyValue::String("#".into()))
        );

        let (tx, rx) = oneshot::channel();
        device.get_with(table::PREAMBLE, move |result| {
            let _ = tx.send(result.unwrap());
        });
        assert!(queue.run_next().await);
        assert_eq!(rx.await.unwrap(), "#");
    }

    #[tokio::test]
    async fn test_manager_discovery_accessors() {
        let runtime = MemoryRuntime::new();
        let info = DeviceInfo::new("Hub", "m1", DeviceType::BLE_MANAGER);
        let (_root, device) = open_device(&runtime, info.clone(), DeliveryContext::Inline).await;
        let manager = DeviceManager(device);

        manager
            .start_discovery(Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(
            runtime.property(manager.handle(), PropertyId::StartDiscovery),
            Some(PropertyValue::ULong(5_000))
        );

        manager.set_favorites("AA,BB").await.unwrap();
        assert_eq!(manager.favorites().await.unwrap(), "AA,BB");

        runtime.seed_property(
            manager.handle(),
            PropertyId::UniqueDeviceIdentifier,
            PropertyValue::String("uid-7".into()),
        );
        assert_eq!(manager.unique_identifier("guid-7").await.unwrap(), "uid-7");
        assert_eq!(
            runtime.last_argument(manager.handle(), PropertyId::UniqueDeviceIdentifier),
            Some(PropertyValue::String("guid-7".into()))
        );
        assert_eq!(manager.info(), &info);
    }
}
