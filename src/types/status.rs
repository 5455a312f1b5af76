//! Live device status values carried by power, battery and button events.

/// Where the device currently draws power from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PowerState {
    /// Power source unknown.
    #[default]
    Unknown = 0x00,
    /// Running on battery.
    OnBattery = 0x01,
    /// Resting on a charging cradle.
    OnCradle = 0x02,
    /// Plugged into AC power.
    OnAc = 0x04,
}

impl PowerState {
    /// Parses a power state from its raw value.
    ///
    /// Values outside the known set map to [`PowerState::Unknown`].
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        match raw {
            0x01 => Self::OnBattery,
            0x02 => Self::OnCradle,
            0x04 => Self::OnAc,
            _ => Self::Unknown,
        }
    }
}

/// Battery charge level in percent (0 to 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BatteryLevel(u8);

impl BatteryLevel {
    /// Creates a level, saturating at 100%.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        if raw > 100 { Self(100) } else { Self(raw as u8) }
    }

    /// Returns the level in percent.
    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }
}

/// Bitmask of device buttons whose state changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ButtonsState(u8);

impl ButtonsState {
    /// No button.
    pub const NONE: Self = Self(0);

    /// Left button.
    pub const LEFT: Self = Self(0x01);

    /// Right button.
    pub const RIGHT: Self = Self(0x02);

    /// Middle (scan) button.
    pub const MIDDLE: Self = Self(0x04);

    /// Power button.
    pub const POWER: Self = Self(0x08);

    /// Ring unit detached (9 series only).
    pub const RING_DETACH: Self = Self(0x10);

    /// Creates a state from a raw byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// Returns the raw byte value.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Check if a button is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }
}
