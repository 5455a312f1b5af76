//! Data types for capture runtime entities.
//!
//! This module contains the plain data structures used throughout the library:
//! - Device identity (type, interface, bluetooth address)
//! - Live status (power, battery, buttons)
//! - Decoded data and data sources
//! - Device and runtime settings
//! - Versions and application credentials

pub mod decoded;
pub mod device;
pub mod settings;
pub mod status;
pub mod version;

pub use decoded::{DataSource, DataSourceId, DataSourceStatus, DecodedData};
pub use device::{BluetoothAddress, DeviceClass, DeviceInfo, DeviceType, InterfaceType};
pub use settings::{
    ConfirmationBeep, ConfirmationLed, ConfirmationMode, ConfirmationRumble, DataAcknowledgment,
    DataConfirmation, LocalDecodeAction, Notifications, SoftScanStatus, StandConfig, Trigger,
};
pub use status::{BatteryLevel, ButtonsState, PowerState};
pub use version::{AppInfo, Version};
