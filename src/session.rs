//! The capture [`Session`].
//!
//! A session owns the root connection to a [`CaptureRuntime`], keeps the
//! registry of connected devices and device managers, and routes every
//! runtime event to the active observer.
//!
//! Opening is reference counted: only the first [`Session::open`] reaches
//! the runtime and only the matching last [`Session::close`] closes it.

use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::channel::{CaptureRuntime, ConnectionHandle, PropertyChannel};
use crate::device::{Device, DeviceManager};
use crate::error::{Error, Result, ResultCode};
use crate::event::delivery::Job;
use crate::event::{CaptureEvent, DeliveryContext, EventKind, EventPayload};
use crate::observer::{Observer, ObserverSlots, ObserverStack, ObserverToken};
use crate::property::table;
use crate::registry::Registry;
use crate::types::{
    AppInfo, BatteryLevel, ButtonsState, ConfirmationMode, DeviceInfo, PowerState,
    SoftScanStatus, Version,
};

/// Default capacity of the inbound event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Configuration for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacity of the inbound event channel.
    pub event_capacity: usize,
    /// Where observer notifications run.
    pub delivery: DeliveryContext,
    /// Where callback-style device accessors complete.
    pub completion: DeliveryContext,
}

impl SessionConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            delivery: DeliveryContext::Inline,
            completion: DeliveryContext::Inline,
        }
    }

    /// Sets the inbound event channel capacity.
    #[must_use]
    pub const fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Sets where observer notifications run.
    #[must_use]
    pub fn delivery(mut self, context: DeliveryContext) -> Self {
        self.delivery = context;
        self
    }

    /// Sets where callback-style device accessors complete.
    #[must_use]
    pub fn completion(mut self, context: DeliveryContext) -> Self {
        self.completion = context;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Lifecycle {
    channel: Option<Arc<dyn PropertyChannel>>,
    open_count: usize,
    process_task: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Routing {
    observers: ObserverStack,
    registry: Registry,
}

/// State shared between the session and its event task.
struct Shared {
    routing: Mutex<Routing>,
    /// Held while notifications are handed to the delivery context, so an
    /// observer's arrival replay and live events never interleave.
    dispatch: Mutex<()>,
    delivery: DeliveryContext,
    completion: DeliveryContext,
}

thread_local! {
    /// Set while this thread holds the dispatch lock.
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Guard returned by [`Shared::dispatch`].
///
/// Empty when the thread already holds the lock, which happens when an
/// inline notification pushes an observer.
struct DispatchGuard<'a>(Option<MutexGuard<'a, ()>>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if self.0.is_some() {
            DISPATCHING.set(false);
        }
    }
}

/// Session with a capture runtime.
pub struct Session {
    runtime: Arc<dyn CaptureRuntime>,
    event_capacity: usize,
    lifecycle: tokio::sync::Mutex<Lifecycle>,
    shared: Arc<Shared>,
}

impl Session {
    /// Creates a closed session with default settings.
    #[must_use]
    pub fn new(runtime: Arc<dyn CaptureRuntime>) -> Self {
        Self::with_config(runtime, SessionConfig::default())
    }

    /// Creates a closed session with custom configuration.
    #[must_use]
    pub fn with_config(runtime: Arc<dyn CaptureRuntime>, config: SessionConfig) -> Self {
        Self {
            runtime,
            event_capacity: config.event_capacity.max(1),
            lifecycle: tokio::sync::Mutex::new(Lifecycle::default()),
            shared: Arc::new(Shared {
                routing: Mutex::new(Routing::default()),
                dispatch: Mutex::new(()),
                delivery: config.delivery,
                completion: config.completion,
            }),
        }
    }

    /// Opens the session.
    ///
    /// The first open presents `app` to the runtime and starts event
    /// processing. Later opens only take another reference. Concurrent
    /// opens share a single handshake.
    pub async fn open(&self, app: &AppInfo) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.open_count > 0 {
            lifecycle.open_count += 1;
            tracing::debug!(open_count = lifecycle.open_count, "session reference taken");
            return Ok(());
        }

        let (events_tx, events_rx) = mpsc::channel(self.event_capacity);
        let channel = self
            .runtime
            .open(app.clone(), events_tx)
            .await
            .inspect_err(|e| tracing::warn!("failed to open session: {}", e))?;

        let process_task = tokio::spawn(process_events(
            Arc::clone(&self.shared),
            Arc::clone(&channel),
            events_rx,
        ));

        tracing::info!(handle = %channel.handle(), bundle = %app.bundle_id, "session opened");
        lifecycle.channel = Some(channel);
        lifecycle.open_count = 1;
        lifecycle.process_task = Some(process_task);
        Ok(())
    }

    /// Releases one reference to the session.
    ///
    /// The last close stops event processing, closes every registered
    /// device and the root connection, and returns the root close result.
    /// The session is closed afterwards whatever that result is. Closing a
    /// closed session does nothing.
    pub async fn close(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        match lifecycle.open_count {
            0 => {
                tracing::debug!("close on a closed session");
                Ok(())
            }
            1 => {
                lifecycle.open_count = 0;
                if let Some(task) = lifecycle.process_task.take() {
                    task.abort();
                }

                let (devices, managers) = self.shared.routing().registry.clear();
                for device in devices
                    .iter()
                    .chain(managers.iter().map(DeviceManager::as_device))
                {
                    if let Err(e) = device.close().await {
                        tracing::warn!(handle = %device.handle(), "failed to close device: {}", e);
                    }
                }

                let result = match lifecycle.channel.take() {
                    Some(channel) => channel.close().await,
                    None => Ok(()),
                };
                match &result {
                    Ok(()) => tracing::info!("session closed"),
                    Err(e) => tracing::warn!("session closed with error: {}", e),
                }
                result
            }
            n => {
                lifecycle.open_count = n - 1;
                tracing::debug!(open_count = n - 1, "session reference released");
                Ok(())
            }
        }
    }

    /// Returns true while at least one open is outstanding.
    pub async fn is_open(&self) -> bool {
        self.lifecycle.lock().await.open_count > 0
    }

    /// Number of outstanding opens.
    pub async fn open_count(&self) -> usize {
        self.lifecycle.lock().await.open_count
    }

    /// Pushes an observer and makes it the active one.
    ///
    /// The observer is immediately told about every device and device
    /// manager already connected, if it has the matching presence
    /// capability. Returns `None` if `observer` is already active.
    ///
    /// The replay is delivered before any live event reaches the observer.
    pub fn push_observer(&self, observer: Arc<dyn Observer>) -> Option<ObserverToken> {
        let _dispatch = self.shared.dispatch();
        let (token, slots, devices, managers) = {
            let mut routing = self.shared.routing();
            let token = routing.observers.push(observer)?;
            let slots = routing
                .observers
                .active_slots()
                .cloned()
                .unwrap_or_default();
            let devices = if slots.device_presence.is_some() {
                routing.registry.devices()
            } else {
                Vec::new()
            };
            let managers = if slots.device_manager_presence.is_some() {
                routing.registry.managers()
            } else {
                Vec::new()
            };
            (token, slots, devices, managers)
        };

        tracing::debug!(
            devices = devices.len(),
            managers = managers.len(),
            "replaying arrivals to new observer"
        );
        if let Some(observer) = slots.device_presence {
            for device in devices {
                let observer = Arc::clone(&observer);
                self.shared
                    .delivery
                    .deliver(move || observer.device_arrival(&device, ResultCode::Success));
            }
        }
        if let Some(observer) = slots.device_manager_presence {
            for manager in managers {
                let observer = Arc::clone(&observer);
                self.shared.delivery.deliver(move || {
                    observer.device_manager_arrival(&manager, ResultCode::Success);
                });
            }
        }
        Some(token)
    }

    /// Pops the active observer if `token` names it.
    ///
    /// Returns `false` and changes nothing otherwise.
    pub fn pop_observer(&self, token: ObserverToken) -> bool {
        self.shared.routing().observers.pop(token)
    }

    /// Snapshot of the connected devices.
    #[must_use]
    pub fn devices(&self) -> Vec<Device> {
        self.shared.routing().registry.devices()
    }

    /// Snapshot of the connected device managers.
    #[must_use]
    pub fn device_managers(&self) -> Vec<DeviceManager> {
        self.shared.routing().registry.managers()
    }

    async fn root(&self) -> Result<Arc<dyn PropertyChannel>> {
        self.lifecycle
            .lock()
            .await
            .channel
            .clone()
            .ok_or(Error::InvalidHandle)
    }

    /// Runtime version.
    pub async fn version(&self) -> Result<Version> {
        let root = self.root().await?;
        table::get(root.as_ref(), &table::VERSION).await
    }

    /// Data confirmation mode.
    pub async fn confirmation_mode(&self) -> Result<ConfirmationMode> {
        let root = self.root().await?;
        table::get(root.as_ref(), &table::CONFIRMATION_MODE).await
    }

    /// Sets the data confirmation mode.
    pub async fn set_confirmation_mode(&self, mode: ConfirmationMode) -> Result<()> {
        let root = self.root().await?;
        table::set(root.as_ref(), &table::CONFIRMATION_MODE, mode).await
    }

    /// Camera scanner availability.
    pub async fn soft_scan_status(&self) -> Result<SoftScanStatus> {
        let root = self.root().await?;
        table::get(root.as_ref(), &table::SOFT_SCAN_STATUS).await
    }

    /// Enables or disables the camera scanner.
    pub async fn set_soft_scan_status(&self, status: SoftScanStatus) -> Result<()> {
        let root = self.root().await?;
        table::set(root.as_ref(), &table::SOFT_SCAN_STATUS, status).await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("event_capacity", &self.event_capacity)
            .field("delivery", &self.shared.delivery)
            .finish_non_exhaustive()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.lifecycle.get_mut().process_task.take() {
            task.abort();
        }
    }
}

/// Processes runtime events in emission order until the stream ends.
async fn process_events(
    shared: Arc<Shared>,
    root: Arc<dyn PropertyChannel>,
    mut events: mpsc::Receiver<CaptureEvent>,
) {
    while let Some(event) = events.recv().await {
        shared.handle_event(root.as_ref(), event).await;
    }
    tracing::debug!("event stream ended");
}

fn unexpected_payload(kind: EventKind, payload: &EventPayload) {
    tracing::warn!(?kind, ?payload, "dropping event with unexpected payload");
}

impl Shared {
    fn routing(&self) -> MutexGuard<'_, Routing> {
        self.routing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the dispatch lock. Always taken before the routing lock.
    fn dispatch(&self) -> DispatchGuard<'_> {
        if DISPATCHING.get() {
            return DispatchGuard(None);
        }
        let lock = self.dispatch.lock().unwrap_or_else(PoisonError::into_inner);
        DISPATCHING.set(true);
        DispatchGuard(Some(lock))
    }

    /// Picks a capability of the active observer.
    fn active<T: ?Sized>(
        &self,
        pick: impl FnOnce(&ObserverSlots) -> Option<Arc<T>>,
    ) -> Option<Arc<T>> {
        self.routing().observers.active_slots().and_then(pick)
    }

    /// Looks up a device and a capability of the active observer together.
    fn device_target<T: ?Sized>(
        &self,
        handle: ConnectionHandle,
        pick: impl FnOnce(&ObserverSlots) -> Option<Arc<T>>,
    ) -> Option<(Device, Arc<T>)> {
        let routing = self.routing();
        let Some(device) = routing.registry.device(handle) else {
            tracing::trace!(%handle, "event for unknown device dropped");
            return None;
        };
        let observer = routing.observers.active_slots().and_then(pick)?;
        Some((device.clone(), observer))
    }

    /// Looks up a device manager and a capability of the active observer together.
    fn manager_target<T: ?Sized>(
        &self,
        handle: ConnectionHandle,
        pick: impl FnOnce(&ObserverSlots) -> Option<Arc<T>>,
    ) -> Option<(DeviceManager, Arc<T>)> {
        let routing = self.routing();
        let Some(manager) = routing.registry.manager(handle) else {
            tracing::trace!(%handle, "event for unknown device manager dropped");
            return None;
        };
        let observer = routing.observers.active_slots().and_then(pick)?;
        Some((manager.clone(), observer))
    }

    /// Classifies one runtime event and notifies the active observer.
    pub(crate) async fn handle_event(&self, root: &dyn PropertyChannel, event: CaptureEvent) {
        tracing::trace!(
            kind = ?event.kind,
            origin = %event.origin,
            result = %event.result,
            "processing event"
        );
        let CaptureEvent {
            kind,
            origin,
            result,
            payload,
        } = event;

        let opened = match (kind, &payload) {
            (
                EventKind::DeviceArrival | EventKind::DeviceManagerArrival,
                EventPayload::DeviceInfo(info),
            ) => match root.open_device(info.guid.clone()).await {
                Ok(channel) => Some(channel),
                Err(e) => {
                    tracing::warn!(?kind, guid = %info.guid, "failed to open arrived device: {}", e);
                    return;
                }
            },
            _ => None,
        };

        let _dispatch = self.dispatch();
        match kind {
            EventKind::Error => {
                if let Some(observer) = self.active(|slots| slots.error.clone()) {
                    self.delivery.deliver(move || observer.error(result));
                }
            }

            EventKind::DeviceArrival => match (payload, opened) {
                (EventPayload::DeviceInfo(info), Some(channel)) => {
                    self.device_arrival(info, channel);
                }
                (other, _) => unexpected_payload(kind, &other),
            },

            EventKind::DeviceManagerArrival => match (payload, opened) {
                (EventPayload::DeviceInfo(info), Some(channel)) => {
                    self.manager_arrival(info, channel);
                }
                (other, _) => unexpected_payload(kind, &other),
            },

            EventKind::DeviceRemoval => self.device_removal(origin, result),

            EventKind::DeviceManagerRemoval => self.manager_removal(origin, result),

            EventKind::DeviceDiscovered => match payload {
                EventPayload::String(identifier) => {
                    if let Some((manager, observer)) =
                        self.manager_target(origin, |slots| slots.discovery.clone())
                    {
                        self.delivery
                            .deliver(move || observer.device_discovered(&identifier, &manager));
                    }
                }
                other => unexpected_payload(kind, &other),
            },

            EventKind::DiscoveryEnd => {
                if let Some((manager, observer)) =
                    self.manager_target(origin, |slots| slots.discovery.clone())
                {
                    self.delivery
                        .deliver(move || observer.discovery_end(result, &manager));
                }
            }

            EventKind::DecodedData => match payload {
                EventPayload::DecodedData(data) => {
                    if let Some((device, observer)) =
                        self.device_target(origin, |slots| slots.decoded_data.clone())
                    {
                        self.delivery
                            .deliver(move || observer.decoded_data(&data, &device, result));
                    }
                }
                other => unexpected_payload(kind, &other),
            },

            EventKind::BatteryLevel => match payload {
                EventPayload::ULong(raw) => {
                    if let Some((device, observer)) =
                        self.device_target(origin, |slots| slots.power.clone())
                    {
                        let level = BatteryLevel::from_raw(raw);
                        self.delivery
                            .deliver(move || observer.battery_level(level, &device));
                    }
                }
                other => unexpected_payload(kind, &other),
            },

            EventKind::Power => match payload {
                EventPayload::ULong(raw) => {
                    if let Some((device, observer)) =
                        self.device_target(origin, |slots| slots.power.clone())
                    {
                        let state = PowerState::from_raw(raw);
                        self.delivery
                            .deliver(move || observer.power_state(state, &device));
                    }
                }
                other => unexpected_payload(kind, &other),
            },

            EventKind::Buttons => match payload {
                EventPayload::Byte(raw) => {
                    if let Some((device, observer)) =
                        self.device_target(origin, |slots| slots.buttons.clone())
                    {
                        let state = ButtonsState::from_byte(raw);
                        self.delivery
                            .deliver(move || observer.buttons_state(state, &device));
                    }
                }
                other => unexpected_payload(kind, &other),
            },

            EventKind::Terminate
            | EventKind::ListenerStarted
            | EventKind::DeviceOwnership
            | EventKind::Unknown(_) => {
                tracing::trace!(?kind, "ignoring event");
            }
        }
    }

    fn device_arrival(&self, info: DeviceInfo, channel: Arc<dyn PropertyChannel>) {
        let device = Device::new(info, channel, self.completion.clone());

        let (registered, observer) = {
            let mut routing = self.routing();
            let registered = routing.registry.insert_device(device.clone());
            let observer = routing
                .observers
                .active_slots()
                .and_then(|slots| slots.device_presence.clone());
            (registered, observer)
        };
        if !registered {
            close_later(device);
            return;
        }

        tracing::info!(handle = %device.handle(), name = %device.name(), "device arrived");
        if let Some(observer) = observer {
            self.delivery
                .deliver(move || observer.device_arrival(&device, ResultCode::Success));
        }
    }

    fn manager_arrival(&self, info: DeviceInfo, channel: Arc<dyn PropertyChannel>) {
        let manager = DeviceManager::new(info, channel, self.completion.clone());

        let (registered, observer) = {
            let mut routing = self.routing();
            let registered = routing.registry.insert_manager(manager.clone());
            let observer = routing
                .observers
                .active_slots()
                .and_then(|slots| slots.device_manager_presence.clone());
            (registered, observer)
        };
        if !registered {
            close_later(manager.as_device().clone());
            return;
        }

        tracing::info!(handle = %manager.handle(), name = %manager.name(), "device manager arrived");
        if let Some(observer) = observer {
            self.delivery.deliver(move || {
                observer.device_manager_arrival(&manager, ResultCode::Success);
            });
        }
    }

    fn device_removal(&self, handle: ConnectionHandle, result: ResultCode) {
        let removed = {
            let mut routing = self.routing();
            routing.registry.remove_device(handle).map(|device| {
                let observer = routing
                    .observers
                    .active_slots()
                    .and_then(|slots| slots.device_presence.clone());
                (device, observer)
            })
        };
        let Some((device, observer)) = removed else {
            tracing::trace!(%handle, "removal of unknown device dropped");
            return;
        };

        tracing::info!(%handle, name = %device.name(), "device removed");
        let notification = observer.map(|observer| {
            let device = device.clone();
            Box::new(move || observer.device_removal(&device, result)) as Job
        });
        self.close_after(device, notification);
    }

    fn manager_removal(&self, handle: ConnectionHandle, result: ResultCode) {
        let removed = {
            let mut routing = self.routing();
            routing.registry.remove_manager(handle).map(|manager| {
                let observer = routing
                    .observers
                    .active_slots()
                    .and_then(|slots| slots.device_manager_presence.clone());
                (manager, observer)
            })
        };
        let Some((manager, observer)) = removed else {
            tracing::trace!(%handle, "removal of unknown device manager dropped");
            return;
        };

        tracing::info!(%handle, name = %manager.name(), "device manager removed");
        let device = manager.as_device().clone();
        let notification = observer.map(|observer| {
            Box::new(move || observer.device_manager_removal(&manager, result)) as Job
        });
        self.close_after(device, notification);
    }

    /// Delivers the removal notification, then closes the device's channel.
    ///
    /// The close waits until the notification has run (or was discarded).
    fn close_after(&self, device: Device, notification: Option<Job>) {
        let (done_tx, done_rx) = oneshot::channel::<()>();
        if let Some(notification) = notification {
            self.delivery.deliver(move || {
                notification();
                let _ = done_tx.send(());
            });
        } else {
            drop(done_tx);
        }

        tokio::spawn(async move {
            let _ = done_rx.await;
            close_device(&device).await;
        });
    }
}

/// Closes a device that could not be registered.
fn close_later(device: Device) {
    tokio::spawn(async move { close_device(&device).await });
}

async fn close_device(device: &Device) {
    if let Err(e) = device.close().await {
        tracing::warn!(handle = %device.handle(), "failed to close device: {}", e);
    }
}
