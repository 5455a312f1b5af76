//! Property identifiers understood by the capture runtime.
//!
//! Identifiers are 32-bit values owned by the runtime. Runtime-level
//! properties have the high bit set; device properties do not.

/// Property identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PropertyId {
    // Runtime properties
    /// Abort the runtime listener.
    Abort = -2_146_435_072,
    /// Runtime version.
    Version = -2_147_418_111,
    /// Runtime interface version.
    InterfaceVersion = -2_147_418_110,
    /// Runtime configuration.
    Configuration = -2_141_913_085,
    /// Data confirmation mode.
    DataConfirmationMode = -2_147_352_572,
    /// Data confirmation action.
    DataConfirmationAction = -2_147_287_035,
    /// Monitor mode.
    MonitorMode = -2_145_124_346,
    /// Camera based scanner availability.
    SoftScanStatus = -2_147_352_569,

    // Device properties
    /// Device firmware version.
    VersionDevice = 65_536,
    /// Packed device type.
    DeviceType = 65_538,
    /// Device specific command.
    DeviceSpecific = 4_456_451,
    /// Data source (symbology) status.
    DataSourceDevice = 7_798_788,
    /// Trigger command.
    TriggerDevice = 1_179_653,
    /// Apply stored configuration.
    ApplyConfigDevice = 1_048_582,
    /// Preamble prepended to decoded data.
    PreambleDevice = 327_687,
    /// Postamble appended to decoded data.
    PostambleDevice = 327_688,
    /// Device capabilities.
    CapabilitiesDevice = 2_162_697,
    /// Change identifier.
    ChangeIdDevice = 65_546,
    /// Data format.
    DataFormatDevice = 131_083,
    /// Friendly name.
    FriendlyNameDevice = 327_936,
    /// Security mode.
    SecurityModeDevice = 131_329,
    /// Pin code.
    PinCodeDevice = 1_376_514,
    /// Delete pairing and bonding.
    DeletePairingBondingDevice = 1_179_907,
    /// Restore factory defaults.
    RestoreFactoryDefaultsDevice = 1_048_836,
    /// Power off.
    SetPowerOffDevice = 1_048_837,
    /// Buttons status.
    ButtonsStatusDevice = 65_798,
    /// Sound configuration.
    SoundConfigDevice = 2_359_559,
    /// Timers.
    TimersDevice = 262_408,
    /// Local acknowledgment.
    LocalAcknowledgmentDevice = 131_337,
    /// Data confirmation (LED, beep, rumble).
    DataConfirmationDevice = 1_245_450,
    /// Battery level.
    BatteryLevelDevice = 65_803,
    /// Local decode action.
    LocalDecodeActionDevice = 131_340,
    /// Bluetooth address.
    BluetoothAddressDevice = 65_805,
    /// Statistic counters.
    StatisticCountersDevice = 65_806,
    /// Rumble configuration.
    RumbleConfigDevice = 2_359_567,
    /// Profile configuration.
    ProfileConfigDevice = 262_416,
    /// Disconnect.
    DisconnectDevice = 1_179_921,
    /// Data store.
    DataStoreDevice = 4_456_722,
    /// Notifications selection.
    NotificationsDevice = 196_883,
    /// Connect reason.
    ConnectReasonDevice = 65_812,
    /// Power state.
    PowerStateDevice = 65_813,
    /// SPP start-up role.
    StartUpRoleSppDevice = 131_350,
    /// Connection beep configuration.
    ConnectionBeepConfigDevice = 131_351,
    /// Camera flash.
    FlashDevice = 131_352,
    /// Camera scanner overlay view parameters.
    OverlayViewDevice = 590_105,
    /// Stand configuration.
    StandConfigDevice = 196_890,

    // Device manager properties
    /// Start a discovery.
    StartDiscovery = 1_245_696,
    /// Favorite devices.
    Favorite = 328_193,
    /// Unique identifier of a discovered device.
    UniqueDeviceIdentifier = 5_308_930,
}

impl PropertyId {
    /// Attempts to parse a property identifier from its raw value.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        let id = match raw {
            -2_146_435_072 => Self::Abort,
            -2_147_418_111 => Self::Version,
            -2_147_418_110 => Self::InterfaceVersion,
            -2_141_913_085 => Self::Configuration,
            -2_147_352_572 => Self::DataConfirmationMode,
            -2_147_287_035 => Self::DataConfirmationAction,
            -2_145_124_346 => Self::MonitorMode,
            -2_147_352_569 => Self::SoftScanStatus,
            65_536 => Self::VersionDevice,
            65_538 => Self::DeviceType,
            4_456_451 => Self::DeviceSpecific,
            7_798_788 => Self::DataSourceDevice,
            1_179_653 => Self::TriggerDevice,
            1_048_582 => Self::ApplyConfigDevice,
            327_687 => Self::PreambleDevice,
            327_688 => Self::PostambleDevice,
            2_162_697 => Self::CapabilitiesDevice,
            65_546 => Self::ChangeIdDevice,
            131_083 => Self::DataFormatDevice,
            327_936 => Self::FriendlyNameDevice,
            131_329 => Self::SecurityModeDevice,
            1_376_514 => Self::PinCodeDevice,
            1_179_907 => Self::DeletePairingBondingDevice,
            1_048_836 => Self::RestoreFactoryDefaultsDevice,
            1_048_837 => Self::SetPowerOffDevice,
            65_798 => Self::ButtonsStatusDevice,
            2_359_559 => Self::SoundConfigDevice,
            262_408 => Self::TimersDevice,
            131_337 => Self::LocalAcknowledgmentDevice,
            1_245_450 => Self::DataConfirmationDevice,
            65_803 => Self::BatteryLevelDevice,
            131_340 => Self::LocalDecodeActionDevice,
            65_805 => Self::BluetoothAddressDevice,
            65_806 => Self::StatisticCountersDevice,
            2_359_567 => Self::RumbleConfigDevice,
            262_416 => Self::ProfileConfigDevice,
            1_179_921 => Self::DisconnectDevice,
            4_456_722 => Self::DataStoreDevice,
            196_883 => Self::NotificationsDevice,
            65_812 => Self::ConnectReasonDevice,
            65_813 => Self::PowerStateDevice,
            131_350 => Self::StartUpRoleSppDevice,
            131_351 => Self::ConnectionBeepConfigDevice,
            131_352 => Self::FlashDevice,
            590_105 => Self::OverlayViewDevice,
            196_890 => Self::StandConfigDevice,
            1_245_696 => Self::StartDiscovery,
            328_193 => Self::Favorite,
            5_308_930 => Self::UniqueDeviceIdentifier,
            _ => return None,
        };
        Some(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Returns true if the property is addressed to a device rather than the runtime.
    #[must_use]
    pub const fn is_device_property(self) -> bool {
        self.as_raw() >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_id_raw_values() {
        assert_eq!(PropertyId::FriendlyNameDevice.as_raw(), 327_936);
        assert_eq!(PropertyId::from_raw(65_803), Some(PropertyId::BatteryLevelDevice));
        assert_eq!(PropertyId::from_raw(-2_147_418_111), Some(PropertyId::Version));
        assert_eq!(PropertyId::from_raw(12), None);
    }

    #[test]
    fn test_device_vs_runtime_properties() {
        assert!(PropertyId::StandConfigDevice.is_device_property());
        assert!(PropertyId::Favorite.is_device_property());
        assert!(!PropertyId::SoftScanStatus.is_device_property());
    }
}
