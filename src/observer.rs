//! Observers and the observer stack.
//!
//! An application component implements [`Observer`] and opts into the
//! notifications it cares about by answering the capability probes with
//! itself. Probing happens once, when the observer is pushed; the answers
//! are kept in [`ObserverSlots`] and the session dispatches through them.
//!
//! ```
//! use std::sync::Arc;
//! use capture_session::{
//!     Device, DecodedData, DecodedDataObserver, Observer, ResultCode,
//! };
//!
//! struct ScanView;
//!
//! impl Observer for ScanView {
//!     fn decoded_data_observer(self: Arc<Self>) -> Option<Arc<dyn DecodedDataObserver>> {
//!         Some(self)
//!     }
//! }
//!
//! impl DecodedDataObserver for ScanView {
//!     fn decoded_data(&self, data: &DecodedData, device: &Device, result: ResultCode) {
//!         println!("{} read {:?} ({result})", device.name(), data.as_str());
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::device::{Device, DeviceManager};
use crate::error::ResultCode;
use crate::types::{BatteryLevel, ButtonsState, DecodedData, PowerState};

/// Runtime errors not tied to any request.
pub trait ErrorObserver: Send + Sync {
    /// The runtime reported an error.
    fn error(&self, result: ResultCode);
}

/// Device connections and disconnections.
pub trait DevicePresenceObserver: Send + Sync {
    /// A device is ready for use.
    fn device_arrival(&self, device: &Device, result: ResultCode);

    /// A device went away. Its channel is closed right after this returns.
    fn device_removal(&self, device: &Device, result: ResultCode);
}

/// Device manager connections and disconnections.
pub trait DeviceManagerPresenceObserver: Send + Sync {
    /// A device manager is ready for use.
    fn device_manager_arrival(&self, manager: &DeviceManager, result: ResultCode);

    /// A device manager went away. Its channel is closed right after this returns.
    fn device_manager_removal(&self, manager: &DeviceManager, result: ResultCode);
}

/// Discovery progress of device managers.
pub trait DiscoveryObserver: Send + Sync {
    /// A manager found a device.
    fn device_discovered(&self, identifier: &str, manager: &DeviceManager);

    /// A manager's discovery finished.
    fn discovery_end(&self, result: ResultCode, manager: &DeviceManager);
}

/// Decoded data.
pub trait DecodedDataObserver: Send + Sync {
    /// A device decoded data. `result` is [`ResultCode::Cancelled`] when a
    /// camera scan was dismissed without reading anything.
    fn decoded_data(&self, data: &DecodedData, device: &Device, result: ResultCode);
}

/// Battery and power source changes.
pub trait PowerObserver: Send + Sync {
    /// Battery level changed.
    fn battery_level(&self, level: BatteryLevel, device: &Device);

    /// Power state changed.
    fn power_state(&self, state: PowerState, device: &Device);
}

/// Button changes.
pub trait ButtonsObserver: Send + Sync {
    /// Buttons state changed.
    fn buttons_state(&self, state: ButtonsState, device: &Device);
}

/// An application component that receives session notifications.
///
/// Every probe defaults to `None`. Answer `Some(self)` for each capability
/// the implementor supports.
pub trait Observer: Send + Sync {
    /// Probes for [`ErrorObserver`].
    fn error_observer(self: Arc<Self>) -> Option<Arc<dyn ErrorObserver>> {
        None
    }

    /// Probes for [`DevicePresenceObserver`].
    fn device_presence_observer(self: Arc<Self>) -> Option<Arc<dyn DevicePresenceObserver>> {
        None
    }

    /// Probes for [`DeviceManagerPresenceObserver`].
    fn device_manager_presence_observer(
        self: Arc<Self>,
    ) -> Option<Arc<dyn DeviceManagerPresenceObserver>> {
        None
    }

    /// Probes for [`DiscoveryObserver`].
    fn discovery_observer(self: Arc<Self>) -> Option<Arc<dyn DiscoveryObserver>> {
        None
    }

    /// Probes for [`DecodedDataObserver`].
    fn decoded_data_observer(self: Arc<Self>) -> Option<Arc<dyn DecodedDataObserver>> {
        None
    }

    /// Probes for [`PowerObserver`].
    fn power_observer(self: Arc<Self>) -> Option<Arc<dyn PowerObserver>> {
        None
    }

    /// Probes for [`ButtonsObserver`].
    fn buttons_observer(self: Arc<Self>) -> Option<Arc<dyn ButtonsObserver>> {
        None
    }
}

/// Capabilities of one observer, probed when it was pushed.
#[derive(Clone, Default)]
pub struct ObserverSlots {
    pub(crate) error: Option<Arc<dyn ErrorObserver>>,
    pub(crate) device_presence: Option<Arc<dyn DevicePresenceObserver>>,
    pub(crate) device_manager_presence: Option<Arc<dyn DeviceManagerPresenceObserver>>,
    pub(crate) discovery: Option<Arc<dyn DiscoveryObserver>>,
    pub(crate) decoded_data: Option<Arc<dyn DecodedDataObserver>>,
    pub(crate) power: Option<Arc<dyn PowerObserver>>,
    pub(crate) buttons: Option<Arc<dyn ButtonsObserver>>,
}

impl ObserverSlots {
    /// Probes every capability of `observer`.
    #[must_use]
    pub fn probe(observer: &Arc<dyn Observer>) -> Self {
        Self {
            error: Arc::clone(observer).error_observer(),
            device_presence: Arc::clone(observer).device_presence_observer(),
            device_manager_presence: Arc::clone(observer).device_manager_presence_observer(),
            discovery: Arc::clone(observer).discovery_observer(),
            decoded_data: Arc::clone(observer).decoded_data_observer(),
            power: Arc::clone(observer).power_observer(),
            buttons: Arc::clone(observer).buttons_observer(),
        }
    }

    /// Number of capabilities present.
    #[must_use]
    pub fn len(&self) -> usize {
        [
            self.error.is_some(),
            self.device_presence.is_some(),
            self.device_manager_presence.is_some(),
            self.discovery.is_some(),
            self.decoded_data.is_some(),
            self.power.is_some(),
            self.buttons.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// Returns true if the observer supports no capability at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ObserverSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSlots")
            .field("error", &self.error.is_some())
            .field("device_presence", &self.device_presence.is_some())
            .field("device_manager_presence", &self.device_manager_presence.is_some())
            .field("discovery", &self.discovery.is_some())
            .field("decoded_data", &self.decoded_data.is_some())
            .field("power", &self.power.is_some())
            .field("buttons", &self.buttons.is_some())
            .finish()
    }
}

/// Registration token returned by a push, required to pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u64);

/// One registration on the stack.
pub struct ObserverEntry {
    token: ObserverToken,
    observer: Arc<dyn Observer>,
    slots: ObserverSlots,
}

impl ObserverEntry {
    /// Registration token.
    #[must_use]
    pub const fn token(&self) -> ObserverToken {
        self.token
    }

    /// The registered observer.
    #[must_use]
    pub fn observer(&self) -> &Arc<dyn Observer> {
        &self.observer
    }

    /// Capabilities probed at push time.
    #[must_use]
    pub const fn slots(&self) -> &ObserverSlots {
        &self.slots
    }
}

impl fmt::Debug for ObserverEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverEntry")
            .field("token", &self.token)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// Stack of observer registrations. The top entry is the active one.
#[derive(Debug, Default)]
pub struct ObserverStack {
    entries: Vec<ObserverEntry>,
    next_token: u64,
}

impl ObserverStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `observer` and makes it active.
    ///
    /// Returns `None` without changing anything if `observer` is already
    /// the active entry.
    pub fn push(&mut self, observer: Arc<dyn Observer>) -> Option<ObserverToken> {
        if self
            .active()
            .is_some_and(|entry| Arc::ptr_eq(&entry.observer, &observer))
        {
            return None;
        }
        self.next_token += 1;
        let token = ObserverToken(self.next_token);
        let slots = ObserverSlots::probe(&observer);
        tracing::debug!(?token, capabilities = slots.len(), "observer pushed");
        self.entries.push(ObserverEntry {
            token,
            observer,
            slots,
        });
        Some(token)
    }

    /// Pops the active entry if `token` names it.
    ///
    /// Returns `false` and leaves the stack unchanged otherwise.
    pub fn pop(&mut self, token: ObserverToken) -> bool {
        match self.entries.last() {
            Some(top) if top.token == token => {
                self.entries.pop();
                tracing::debug!(?token, "observer popped");
                true
            }
            _ => {
                tracing::debug!(?token, "pop refused, token is not the active observer");
                false
            }
        }
    }

    /// Returns the active entry.
    #[must_use]
    pub fn active(&self) -> Option<&ObserverEntry> {
        self.entries.last()
    }

    /// Returns the active entry's capabilities.
    #[must_use]
    pub fn active_slots(&self) -> Option<&ObserverSlots> {
        self.active().map(ObserverEntry::slots)
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
