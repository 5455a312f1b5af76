//! Property accessor table.
//!
//! Every typed accessor is one [`Property`] constant: a property id plus an
//! encoder for the input and a decoder for the output. A single generic
//! routine ([`get`], [`query`], [`set`]) drives all of them over any
//! [`PropertyChannel`].
//!
//! `I` is what is sent (on set, or as a query argument); `O` is what comes
//! back on reads. Read-only properties use `I = ()`, write-only ones `O = ()`.

use std::time::Duration;

use bytes::Bytes;

use crate::channel::PropertyChannel;
use crate::error::{Error, Result};
use crate::property::{ObjectMap, PropertyId, PropertyValue};
use crate::types::{
    BatteryLevel, BluetoothAddress, ButtonsState, ConfirmationMode, DataAcknowledgment,
    DataConfirmation, DataSource, DeviceType, LocalDecodeAction, Notifications, PowerState,
    SoftScanStatus, StandConfig, Trigger, Version,
};

/// A typed accessor for one property.
pub struct Property<I, O> {
    /// Property identifier.
    pub id: PropertyId,
    /// Encodes the input into a property value.
    pub encode: fn(I) -> PropertyValue,
    /// Decodes a property value, `None` if it has the wrong shape.
    pub decode: fn(PropertyValue) -> Option<O>,
}

impl<I, O> Property<I, O> {
    /// Decodes `value`, reporting a shape mismatch as an error.
    pub fn decode_value(&self, value: PropertyValue) -> Result<O> {
        let found = value.kind();
        (self.decode)(value).ok_or(Error::UnexpectedValue { id: self.id, found })
    }
}

impl<I, O> Clone for Property<I, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, O> Copy for Property<I, O> {}

impl<I, O> std::fmt::Debug for Property<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Property").field(&self.id).finish()
    }
}

/// Reads a property with no argument.
pub async fn get<I, O>(channel: &dyn PropertyChannel, property: &Property<I, O>) -> Result<O> {
    let value = channel.get_property(property.id, PropertyValue::None).await?;
    property.decode_value(value)
}

/// Reads a property, passing `input` as the query argument.
pub async fn query<I, O>(
    channel: &dyn PropertyChannel,
    property: &Property<I, O>,
    input: I,
) -> Result<O> {
    let value = channel
        .get_property(property.id, (property.encode)(input))
        .await?;
    property.decode_value(value)
}

/// Writes a property.
pub async fn set<I, O>(
    channel: &dyn PropertyChannel,
    property: &Property<I, O>,
    input: I,
) -> Result<()> {
    channel
        .set_property(property.id, (property.encode)(input))
        .await
}

// ==================== Encoders ====================

fn encode_none(_: ()) -> PropertyValue {
    PropertyValue::None
}

fn encode_string(value: String) -> PropertyValue {
    PropertyValue::String(value)
}

fn encode_array(value: Bytes) -> PropertyValue {
    PropertyValue::Array(value)
}

fn encode_data_source(value: DataSource) -> PropertyValue {
    PropertyValue::DataSource(value)
}

fn encode_object(value: ObjectMap) -> PropertyValue {
    PropertyValue::Object(value)
}

fn encode_stand_config(value: StandConfig) -> PropertyValue {
    PropertyValue::ULong(value as u64)
}

fn encode_decode_action(value: LocalDecodeAction) -> PropertyValue {
    PropertyValue::Byte(value.as_byte())
}

fn encode_data_acknowledgment(value: DataAcknowledgment) -> PropertyValue {
    PropertyValue::ULong(value as u64)
}

fn encode_trigger(value: Trigger) -> PropertyValue {
    PropertyValue::Byte(value as u8)
}

fn encode_data_confirmation(value: DataConfirmation) -> PropertyValue {
    PropertyValue::ULong(value.to_raw())
}

fn encode_notifications(value: Notifications) -> PropertyValue {
    PropertyValue::ULong(u64::from(value.as_raw()))
}

fn encode_timeout(value: Duration) -> PropertyValue {
    PropertyValue::ULong(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

fn encode_confirmation_mode(value: ConfirmationMode) -> PropertyValue {
    PropertyValue::Byte(value as u8)
}

fn encode_soft_scan_status(value: SoftScanStatus) -> PropertyValue {
    PropertyValue::Byte(value as u8)
}

// ==================== Decoders ====================

#[allow(clippy::unnecessary_wraps)]
fn decode_unit(_: PropertyValue) -> Option<()> {
    Some(())
}

fn decode_string(value: PropertyValue) -> Option<String> {
    value.into_string()
}

fn decode_array(value: PropertyValue) -> Option<Bytes> {
    value.into_array()
}

fn decode_data_source(value: PropertyValue) -> Option<DataSource> {
    value.into_data_source()
}

fn decode_object(value: PropertyValue) -> Option<ObjectMap> {
    value.into_object()
}

fn decode_version(value: PropertyValue) -> Option<Version> {
    value.as_version()
}

fn decode_bluetooth_address(value: PropertyValue) -> Option<BluetoothAddress> {
    value
        .into_array()
        .and_then(|bytes| BluetoothAddress::try_from_bytes(&bytes))
}

fn decode_device_type(value: PropertyValue) -> Option<DeviceType> {
    value
        .as_ulong()
        .and_then(|raw| u32::try_from(raw).ok())
        .map(DeviceType::from_raw)
}

fn decode_battery_level(value: PropertyValue) -> Option<BatteryLevel> {
    value.as_ulong().map(BatteryLevel::from_raw)
}

fn decode_power_state(value: PropertyValue) -> Option<PowerState> {
    value.as_ulong().map(PowerState::from_raw)
}

fn decode_buttons_state(value: PropertyValue) -> Option<ButtonsState> {
    value.as_byte().map(ButtonsState::from_byte)
}

fn decode_stand_config(value: PropertyValue) -> Option<StandConfig> {
    value.as_ulong().map(StandConfig::from_raw)
}

fn decode_decode_action(value: PropertyValue) -> Option<LocalDecodeAction> {
    value.as_byte().map(LocalDecodeAction::from_byte)
}

fn decode_data_acknowledgment(value: PropertyValue) -> Option<DataAcknowledgment> {
    value.as_ulong().map(DataAcknowledgment::from_raw)
}

fn decode_notifications(value: PropertyValue) -> Option<Notifications> {
    value
        .as_ulong()
        .and_then(|raw| u32::try_from(raw).ok())
        .map(Notifications::from_raw)
}

fn decode_confirmation_mode(value: PropertyValue) -> Option<ConfirmationMode> {
    value.as_byte().map(ConfirmationMode::from_byte)
}

fn decode_soft_scan_status(value: PropertyValue) -> Option<SoftScanStatus> {
    value.as_byte().map(SoftScanStatus::from_byte)
}

// ==================== Device Properties ====================

/// Friendly name (up to 31 UTF-8 bytes).
pub const FRIENDLY_NAME: Property<String, String> = Property {
    id: PropertyId::FriendlyNameDevice,
    encode: encode_string,
    decode: decode_string,
};

/// Bluetooth address.
pub const BLUETOOTH_ADDRESS: Property<(), BluetoothAddress> = Property {
    id: PropertyId::BluetoothAddressDevice,
    encode: encode_none,
    decode: decode_bluetooth_address,
};

/// Packed device type.
pub const DEVICE_TYPE: Property<(), DeviceType> = Property {
    id: PropertyId::DeviceType,
    encode: encode_none,
    decode: decode_device_type,
};

/// Firmware version.
pub const FIRMWARE_VERSION: Property<(), Version> = Property {
    id: PropertyId::VersionDevice,
    encode: encode_none,
    decode: decode_version,
};

/// Battery level.
pub const BATTERY_LEVEL: Property<(), BatteryLevel> = Property {
    id: PropertyId::BatteryLevelDevice,
    encode: encode_none,
    decode: decode_battery_level,
};

/// Power state.
pub const POWER_STATE: Property<(), PowerState> = Property {
    id: PropertyId::PowerStateDevice,
    encode: encode_none,
    decode: decode_power_state,
};

/// Buttons state.
pub const BUTTONS_STATE: Property<(), ButtonsState> = Property {
    id: PropertyId::ButtonsStatusDevice,
    encode: encode_none,
    decode: decode_buttons_state,
};

/// Stand configuration.
pub const STAND_CONFIG: Property<StandConfig, StandConfig> = Property {
    id: PropertyId::StandConfigDevice,
    encode: encode_stand_config,
    decode: decode_stand_config,
};

/// Local decode action.
pub const DECODE_ACTION: Property<LocalDecodeAction, LocalDecodeAction> = Property {
    id: PropertyId::LocalDecodeActionDevice,
    encode: encode_decode_action,
    decode: decode_decode_action,
};

/// Local data acknowledgment.
pub const DATA_ACKNOWLEDGMENT: Property<DataAcknowledgment, DataAcknowledgment> = Property {
    id: PropertyId::LocalAcknowledgmentDevice,
    encode: encode_data_acknowledgment,
    decode: decode_data_acknowledgment,
};

/// Preamble prepended to decoded data.
pub const PREAMBLE: Property<String, String> = Property {
    id: PropertyId::PreambleDevice,
    encode: encode_string,
    decode: decode_string,
};

/// Postamble appended to decoded data.
pub const POSTAMBLE: Property<String, String> = Property {
    id: PropertyId::PostambleDevice,
    encode: encode_string,
    decode: decode_string,
};

/// Data source status. Query with a [`DataSource`] naming the id, set to toggle.
pub const DATA_SOURCE: Property<DataSource, DataSource> = Property {
    id: PropertyId::DataSourceDevice,
    encode: encode_data_source,
    decode: decode_data_source,
};

/// Trigger command (set only).
pub const TRIGGER: Property<Trigger, ()> = Property {
    id: PropertyId::TriggerDevice,
    encode: encode_trigger,
    decode: decode_unit,
};

/// Data confirmation feedback (set only).
pub const DATA_CONFIRMATION: Property<DataConfirmation, ()> = Property {
    id: PropertyId::DataConfirmationDevice,
    encode: encode_data_confirmation,
    decode: decode_unit,
};

/// Notifications the device sends on its own.
pub const NOTIFICATIONS: Property<Notifications, Notifications> = Property {
    id: PropertyId::NotificationsDevice,
    encode: encode_notifications,
    decode: decode_notifications,
};

/// Camera scanner overlay view parameters.
pub const OVERLAY_VIEW: Property<ObjectMap, ObjectMap> = Property {
    id: PropertyId::OverlayViewDevice,
    encode: encode_object,
    decode: decode_object,
};

/// Device specific command. Query with the command bytes.
pub const DEVICE_SPECIFIC: Property<Bytes, Bytes> = Property {
    id: PropertyId::DeviceSpecific,
    encode: encode_array,
    decode: decode_array,
};

// ==================== Device Manager Properties ====================

/// Starts a discovery lasting at most the given timeout (set only).
pub const START_DISCOVERY: Property<Duration, ()> = Property {
    id: PropertyId::StartDiscovery,
    encode: encode_timeout,
    decode: decode_unit,
};

/// Favorite devices, a comma separated list of identifiers.
pub const FAVORITES: Property<String, String> = Property {
    id: PropertyId::Favorite,
    encode: encode_string,
    decode: decode_string,
};

/// Unique identifier of a discovered device. Query with the device GUID.
pub const UNIQUE_DEVICE_IDENTIFIER: Property<String, String> = Property {
    id: PropertyId::UniqueDeviceIdentifier,
    encode: encode_string,
    decode: decode_string,
};

// ==================== Runtime Properties ====================

/// Runtime version.
pub const VERSION: Property<(), Version> = Property {
    id: PropertyId::Version,
    encode: encode_none,
    decode: decode_version,
};

/// Data confirmation mode.
pub const CONFIRMATION_MODE: Property<ConfirmationMode, ConfirmationMode> = Property {
    id: PropertyId::DataConfirmationMode,
    encode: encode_confirmation_mode,
    decode: decode_confirmation_mode,
};

/// Camera scanner availability.
pub const SOFT_SCAN_STATUS: Property<SoftScanStatus, SoftScanStatus> = Property {
    id: PropertyId::SoftScanStatus,
    encode: encode_soft_scan_status,
    decode: decode_soft_scan_status,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyType;
    use crate::types::{ConfirmationBeep, DataSourceStatus};

    #[test]
    fn test_encoders_pick_runtime_types() {
        assert_eq!(
            (STAND_CONFIG.encode)(StandConfig::Auto),
            PropertyValue::ULong(3)
        );
        assert_eq!((TRIGGER.encode)(Trigger::Start), PropertyValue::Byte(1));
        assert_eq!(
            (START_DISCOVERY.encode)(Duration::from_secs(30)),
            PropertyValue::ULong(30_000)
        );
        let confirm = DataConfirmation {
            beep: ConfirmationBeep::Bad,
            ..DataConfirmation::default()
        };
        assert_eq!(
            (DATA_CONFIRMATION.encode)(confirm),
            PropertyValue::ULong(0b10_00)
        );
    }

    #[test]
    fn test_decode_value_reports_mismatch() {
        let err = BATTERY_LEVEL
            .decode_value(PropertyValue::String("full".into()))
            .unwrap_err();
        match err {
            Error::UnexpectedValue { id, found } => {
                assert_eq!(id, PropertyId::BatteryLevelDevice);
                assert_eq!(found, PropertyType::String);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decoders() {
        assert_eq!(
            BATTERY_LEVEL.decode_value(PropertyValue::ULong(80)).unwrap(),
            BatteryLevel::from_raw(80)
        );
        assert_eq!(
            BUTTONS_STATE.decode_value(PropertyValue::Byte(0x08)).unwrap(),
            ButtonsState::POWER
        );
        let address = BLUETOOTH_ADDRESS
            .decode_value(PropertyValue::Array(Bytes::from_static(&[1, 2, 3, 4, 5, 6])))
            .unwrap();
        assert_eq!(address.to_hex(), "010203040506");
        assert!(BLUETOOTH_ADDRESS
            .decode_value(PropertyValue::Array(Bytes::from_static(&[1, 2])))
            .is_err());
        let source = DATA_SOURCE
            .decode_value(PropertyValue::DataSource(DataSource::new(
                3,
                DataSourceStatus::Enabled,
            )))
            .unwrap();
        assert_eq!(source.status, DataSourceStatus::Enabled);
    }

    #[test]
    fn test_out_of_range_ulong_is_rejected() {
        let too_wide = PropertyValue::ULong(u64::from(u32::MAX) + 1);
        assert!(matches!(
            DEVICE_TYPE.decode_value(too_wide.clone()),
            Err(Error::UnexpectedValue { id: PropertyId::DeviceType, .. })
        ));
        assert!(NOTIFICATIONS.decode_value(too_wide).is_err());
        assert_eq!(
            NOTIFICATIONS
                .decode_value(PropertyValue::ULong(0b10_0001))
                .unwrap(),
            Notifications::SCAN_BUTTON_PRESS.with(Notifications::BATTERY_LEVEL_CHANGE)
        );
    }

    #[test]
    fn test_write_only_properties_ignore_reply() {
        assert!(TRIGGER.decode_value(PropertyValue::None).is_ok());
        assert!(START_DISCOVERY.decode_value(PropertyValue::ULong(1)).is_ok());
    }
}
