//! Events raised by the capture runtime.
//!
//! Every event arrives on the root connection's event stream and carries
//! the handle of the connection it concerns, a result code and a payload
//! whose shape depends on the event kind.

pub mod delivery;

use bytes::Bytes;

use crate::channel::ConnectionHandle;
use crate::error::ResultCode;
use crate::types::{DecodedData, DeviceInfo};

pub use delivery::{DeliveryContext, DeliveryQueue};

/// Kind of a runtime event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A device connected.
    DeviceArrival,
    /// A device disconnected.
    DeviceRemoval,
    /// The runtime is terminating.
    Terminate,
    /// The runtime hit an unexpected error.
    Error,
    /// A device decoded data.
    DecodedData,
    /// A device's power state changed.
    Power,
    /// A device's buttons changed.
    Buttons,
    /// A device's battery level changed.
    BatteryLevel,
    /// The runtime's port listener started.
    ListenerStarted,
    /// Device ownership changed.
    DeviceOwnership,
    /// A device manager connected.
    DeviceManagerArrival,
    /// A device manager disconnected.
    DeviceManagerRemoval,
    /// A device manager discovered a device.
    DeviceDiscovered,
    /// A device manager finished discovering.
    DiscoveryEnd,
    /// An event id this library does not know.
    Unknown(i32),
}

impl EventKind {
    /// Parses an event kind from its raw id.
    #[must_use]
    pub const fn from_id(id: i32) -> Self {
        match id {
            1 => Self::DeviceArrival,
            2 => Self::DeviceRemoval,
            3 => Self::Terminate,
            4 => Self::Error,
            5 => Self::DecodedData,
            6 => Self::Power,
            7 => Self::Buttons,
            8 => Self::BatteryLevel,
            9 => Self::ListenerStarted,
            10 => Self::DeviceOwnership,
            11 => Self::DeviceManagerArrival,
            12 => Self::DeviceManagerRemoval,
            13 => Self::DeviceDiscovered,
            14 => Self::DiscoveryEnd,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw event id.
    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::DeviceArrival => 1,
            Self::DeviceRemoval => 2,
            Self::Terminate => 3,
            Self::Error => 4,
            Self::DecodedData => 5,
            Self::Power => 6,
            Self::Buttons => 7,
            Self::BatteryLevel => 8,
            Self::ListenerStarted => 9,
            Self::DeviceOwnership => 10,
            Self::DeviceManagerArrival => 11,
            Self::DeviceManagerRemoval => 12,
            Self::DeviceDiscovered => 13,
            Self::DiscoveryEnd => 14,
            Self::Unknown(id) => id,
        }
    }
}

/// Data attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EventPayload {
    /// No data.
    #[default]
    None,
    /// Single byte (buttons).
    Byte(u8),
    /// Unsigned long (power state, battery level).
    ULong(u64),
    /// Byte array.
    Array(Bytes),
    /// String (discovered device identifier).
    String(String),
    /// Decoded data record.
    DecodedData(DecodedData),
    /// Device identity (arrivals).
    DeviceInfo(DeviceInfo),
}

/// An event raised by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEvent {
    /// Event kind.
    pub kind: EventKind,
    /// Connection the event concerns.
    pub origin: ConnectionHandle,
    /// Result code attached by the runtime.
    pub result: ResultCode,
    /// Event data.
    pub payload: EventPayload,
}

impl CaptureEvent {
    /// Creates a successful event without payload.
    #[must_use]
    pub fn new(kind: EventKind, origin: ConnectionHandle) -> Self {
        Self {
            kind,
            origin,
            result: ResultCode::Success,
            payload: EventPayload::None,
        }
    }

    /// Sets the result code.
    #[must_use]
    pub fn with_result(mut self, result: ResultCode) -> Self {
        self.result = result;
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// A runtime error event.
    #[must_use]
    pub fn error(origin: ConnectionHandle, result: ResultCode) -> Self {
        Self::new(EventKind::Error, origin).with_result(result)
    }

    /// A device (or device manager) arrival reported on the root connection.
    ///
    /// The kind is picked from the device class in `info`.
    #[must_use]
    pub fn arrival(root: ConnectionHandle, info: DeviceInfo) -> Self {
        let kind = if info.device_type.is_device_manager() {
            EventKind::DeviceManagerArrival
        } else {
            EventKind::DeviceArrival
        };
        Self::new(kind, root).with_payload(EventPayload::DeviceInfo(info))
    }

    /// A device removal reported on the device's own connection.
    #[must_use]
    pub fn device_removal(device: ConnectionHandle) -> Self {
        Self::new(EventKind::DeviceRemoval, device)
    }

    /// A device manager removal reported on the manager's own connection.
    #[must_use]
    pub fn device_manager_removal(manager: ConnectionHandle) -> Self {
        Self::new(EventKind::DeviceManagerRemoval, manager)
    }

    /// Decoded data from a device.
    #[must_use]
    pub fn decoded_data(device: ConnectionHandle, data: DecodedData) -> Self {
        Self::new(EventKind::DecodedData, device).with_payload(EventPayload::DecodedData(data))
    }

    /// A device found by a manager's discovery.
    #[must_use]
    pub fn device_discovered(manager: ConnectionHandle, identifier: impl Into<String>) -> Self {
        Self::new(EventKind::DeviceDiscovered, manager)
            .with_payload(EventPayload::String(identifier.into()))
    }

    /// End of a manager's discovery.
    #[must_use]
    pub fn discovery_end(manager: ConnectionHandle, result: ResultCode) -> Self {
        Self::new(EventKind::DiscoveryEnd, manager).with_result(result)
    }

    /// Battery level change.
    #[must_use]
    pub fn battery_level(device: ConnectionHandle, level: u64) -> Self {
        Self::new(EventKind::BatteryLevel, device).with_payload(EventPayload::ULong(level))
    }

    /// Power state change.
    #[must_use]
    pub fn power(device: ConnectionHandle, state: u64) -> Self {
        Self::new(EventKind::Power, device).with_payload(EventPayload::ULong(state))
    }

    /// Buttons state change.
    #[must_use]
    pub fn buttons(device: ConnectionHandle, state: u8) -> Self {
        Self::new(EventKind::Buttons, device).with_payload(EventPayload::Byte(state))
    }
}
