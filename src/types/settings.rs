//! Typed device and runtime settings.
//!
//! Each setting mirrors the raw scalar the runtime stores for the matching
//! property. Parsing is lenient: unknown raw values fall back to a default
//! variant, so a newer runtime never makes an accessor fail.

/// How a device behaves when resting on (or lifted from) its stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum StandConfig {
    /// Always in trigger mode.
    #[default]
    Mobile = 0,
    /// Always in presentation mode.
    Kiosk = 1,
    /// Presentation mode on the stand, trigger mode otherwise.
    Detect = 2,
    /// Presentation mode until the trigger is pressed.
    Auto = 3,
}

impl StandConfig {
    /// Parses a stand configuration from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        match raw {
            1 => Self::Kiosk,
            2 => Self::Detect,
            3 => Self::Auto,
            _ => Self::Mobile,
        }
    }
}

/// Trigger command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Trigger {
    /// Start a scan.
    Start = 1,
    /// Stop a scan.
    Stop = 2,
    /// Re-enable the trigger button.
    Enable = 3,
    /// Disable the trigger button.
    Disable = 4,
    /// Start continuous scanning (camera scanner only).
    ContinuousScan = 5,
}

/// Local feedback when the device reads a code (bitmask).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LocalDecodeAction(u8);

impl LocalDecodeAction {
    /// No local feedback.
    pub const NONE: Self = Self(0);

    /// Beep.
    pub const BEEP: Self = Self(1);

    /// Flash the LED.
    pub const FLASH: Self = Self(2);

    /// Vibrate.
    pub const RUMBLE: Self = Self(4);

    /// Creates an action set from a raw byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// Returns the raw byte value.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Combines two action sets.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if an action is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }
}

/// Whether the device acknowledges decoded data on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DataAcknowledgment {
    /// The device waits for the host.
    #[default]
    Off = 0,
    /// The device acknowledges locally.
    On = 1,
}

impl DataAcknowledgment {
    /// Parses the acknowledgment mode from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        if raw == 1 { Self::On } else { Self::Off }
    }
}

/// Who confirms decoded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ConfirmationMode {
    /// Use the device configuration.
    #[default]
    Off = 0,
    /// The device confirms locally.
    Device = 1,
    /// The runtime confirms on receipt.
    Capture = 2,
    /// The application confirms.
    App = 3,
}

impl ConfirmationMode {
    /// Parses the confirmation mode from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            1 => Self::Device,
            2 => Self::Capture,
            3 => Self::App,
            _ => Self::Off,
        }
    }
}

/// Availability of the camera based scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SoftScanStatus {
    /// Enabled.
    Enabled = 0,
    /// Disabled.
    #[default]
    Disabled = 1,
    /// Not supported (set only).
    NotSupported = 2,
    /// Supported (set only).
    Supported = 3,
}

impl SoftScanStatus {
    /// Parses the status from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Self::Enabled,
            2 => Self::NotSupported,
            3 => Self::Supported,
            _ => Self::Disabled,
        }
    }
}

/// Notifications a device sends on its own (bitmask).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Notifications(u32);

impl Notifications {
    /// No notifications.
    pub const NONE: Self = Self(0);

    /// Scan button pressed.
    pub const SCAN_BUTTON_PRESS: Self = Self(1 << 0);

    /// Scan button released.
    pub const SCAN_BUTTON_RELEASE: Self = Self(1 << 1);

    /// Power button pressed.
    pub const POWER_BUTTON_PRESS: Self = Self(1 << 2);

    /// Power button released.
    pub const POWER_BUTTON_RELEASE: Self = Self(1 << 3);

    /// Power state changed.
    pub const POWER_STATE: Self = Self(1 << 4);

    /// Battery level changed.
    pub const BATTERY_LEVEL_CHANGE: Self = Self(1 << 5);

    /// Creates notifications from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Combines two notification sets.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if a notification is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }
}

/// LED feedback when confirming a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ConfirmationLed {
    /// No LED.
    #[default]
    None = 0,
    /// Green flash.
    Green = 1,
    /// Red flash.
    Red = 2,
}

/// Beep feedback when confirming a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ConfirmationBeep {
    /// No beep.
    #[default]
    None = 0,
    /// Good-read beep.
    Good = 1,
    /// Bad-read beep.
    Bad = 2,
}

/// Rumble feedback when confirming a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ConfirmationRumble {
    /// No rumble.
    #[default]
    None = 0,
    /// Good-read rumble.
    Good = 1,
    /// Bad-read rumble.
    Bad = 2,
}

/// Feedback the host asks a device to play for a read.
///
/// Good and bad settings must not be mixed within one confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DataConfirmation {
    /// LED feedback.
    pub led: ConfirmationLed,
    /// Beep feedback.
    pub beep: ConfirmationBeep,
    /// Rumble feedback.
    pub rumble: ConfirmationRumble,
}

impl DataConfirmation {
    /// Confirmation for a good read: green LED, good beep, good rumble.
    pub const GOOD: Self = Self {
        led: ConfirmationLed::Green,
        beep: ConfirmationBeep::Good,
        rumble: ConfirmationRumble::Good,
    };

    /// Confirmation for a bad read: red LED, bad beep, bad rumble.
    pub const BAD: Self = Self {
        led: ConfirmationLed::Red,
        beep: ConfirmationBeep::Bad,
        rumble: ConfirmationRumble::Bad,
    };

    /// Packs the confirmation into the runtime's scalar layout.
    ///
    /// Layout: `[reserved:10] ... [rumble:2 @4] [beep:2 @2] [led:2 @0]`.
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        (((self.rumble as u64) & 0x3) << 4) | (((self.beep as u64) & 0x3) << 2) | ((self.led as u64) & 0x3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stand_config_fallback() {
        assert_eq!(StandConfig::from_raw(2), StandConfig::Detect);
        assert_eq!(StandConfig::from_raw(99), StandConfig::Mobile);
    }

    #[test]
    fn test_data_confirmation_packing() {
        assert_eq!(DataConfirmation::GOOD.to_raw(), 0b01_01_01);
        assert_eq!(DataConfirmation::BAD.to_raw(), 0b10_10_10);
        let beep_only = DataConfirmation {
            beep: ConfirmationBeep::Good,
            ..DataConfirmation::default()
        };
        assert_eq!(beep_only.to_raw(), 0b00_01_00);
    }

    #[test]
    fn test_notifications_flags() {
        let n = Notifications::SCAN_BUTTON_PRESS.with(Notifications::BATTERY_LEVEL_CHANGE);
        assert_eq!(n.as_raw(), 0b10_0001);
        assert!(n.contains(Notifications::BATTERY_LEVEL_CHANGE));
        assert!(!n.contains(Notifications::POWER_STATE));
    }

    #[test]
    fn test_local_decode_action() {
        let action = LocalDecodeAction::BEEP.with(LocalDecodeAction::RUMBLE);
        assert_eq!(action.as_byte(), 5);
        assert!(!action.contains(LocalDecodeAction::FLASH));
    }

    #[test]
    fn test_soft_scan_and_confirmation_mode() {
        assert_eq!(SoftScanStatus::from_byte(0), SoftScanStatus::Enabled);
        assert_eq!(SoftScanStatus::from_byte(7), SoftScanStatus::Disabled);
        assert_eq!(ConfirmationMode::from_byte(3), ConfirmationMode::App);
    }
}
