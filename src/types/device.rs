//! Device identity types.

use std::fmt;

/// Length of a bluetooth address in bytes.
pub const BLUETOOTH_ADDRESS_LEN: usize = 6;

/// Physical interface a device is attached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum InterfaceType {
    /// Interface not specified (e.g. the camera based scanner).
    #[default]
    None = 0,
    /// Secure Digital card.
    Sd = 1,
    /// Compact Flash card.
    Cf = 2,
    /// Classic bluetooth.
    Bluetooth = 3,
    /// Serial port.
    Serial = 4,
    /// Bluetooth low energy.
    Ble = 5,
}

impl InterfaceType {
    /// Parses an interface type from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            1 => Self::Sd,
            2 => Self::Cf,
            3 => Self::Bluetooth,
            4 => Self::Serial,
            5 => Self::Ble,
            _ => Self::None,
        }
    }
}

/// Whether a connection is a plain device or a device manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DeviceClass {
    /// A scanner or similar data source.
    #[default]
    Device = 0,
    /// A manager able to discover and connect devices.
    DeviceManager = 1,
}

/// Packed device type: `class << 24 | interface << 16 | product`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceType(u32);

impl DeviceType {
    /// Unknown device type.
    pub const NONE: Self = Self::new(DeviceClass::Device, InterfaceType::None, 0);
    /// 7 series scanner.
    pub const SCANNER_7: Self = Self::new(DeviceClass::Device, InterfaceType::Bluetooth, 1);
    /// 7x series scanner.
    pub const SCANNER_7X: Self = Self::new(DeviceClass::Device, InterfaceType::Bluetooth, 2);
    /// 9 series scanner.
    pub const SCANNER_9: Self = Self::new(DeviceClass::Device, InterfaceType::Bluetooth, 3);
    /// 7xi series scanner.
    pub const SCANNER_7XI: Self = Self::new(DeviceClass::Device, InterfaceType::Bluetooth, 4);
    /// Camera based scanner running on the host.
    pub const SOFT_SCAN: Self = Self::new(DeviceClass::Device, InterfaceType::None, 5);
    /// 8ci series scanner.
    pub const SCANNER_8CI: Self = Self::new(DeviceClass::Device, InterfaceType::Bluetooth, 6);
    /// 8qi series scanner.
    pub const SCANNER_8QI: Self = Self::new(DeviceClass::Device, InterfaceType::Bluetooth, 7);
    /// D700 series scanner.
    pub const SCANNER_D700: Self = Self::new(DeviceClass::Device, InterfaceType::Bluetooth, 8);
    /// D730 series scanner.
    pub const SCANNER_D730: Self = Self::new(DeviceClass::Device, InterfaceType::Bluetooth, 9);
    /// D750 series scanner.
    pub const SCANNER_D750: Self = Self::new(DeviceClass::Device, InterfaceType::Bluetooth, 10);
    /// D600 series reader.
    pub const SCANNER_D600: Self = Self::new(DeviceClass::Device, InterfaceType::Ble, 11);
    /// Bluetooth low energy device manager.
    pub const BLE_MANAGER: Self = Self::new(DeviceClass::DeviceManager, InterfaceType::Ble, 1);

    /// Packs a device type from its parts.
    #[must_use]
    pub const fn new(class: DeviceClass, interface: InterfaceType, product: u16) -> Self {
        Self(((class as u32) << 24) | ((interface as u32) << 16) | product as u32)
    }

    /// Creates a device type from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns the device class.
    #[must_use]
    pub const fn class(self) -> DeviceClass {
        if (self.0 >> 24) & 0xFF == 1 {
            DeviceClass::DeviceManager
        } else {
            DeviceClass::Device
        }
    }

    /// Returns the interface the device is attached through.
    #[must_use]
    pub const fn interface(self) -> InterfaceType {
        InterfaceType::from_byte(((self.0 >> 16) & 0xFF) as u8)
    }

    /// Returns the product (or manager) identifier.
    #[must_use]
    pub const fn product(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Returns true if this type describes a device manager.
    #[must_use]
    pub const fn is_device_manager(self) -> bool {
        matches!(self.class(), DeviceClass::DeviceManager)
    }
}

/// Identity of a device as reported on arrival.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Friendly name.
    pub name: String,
    /// Runtime-assigned GUID, used to open the device.
    pub guid: String,
    /// Packed device type.
    pub device_type: DeviceType,
}

impl DeviceInfo {
    /// Creates device info.
    #[must_use]
    pub fn new(name: impl Into<String>, guid: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            name: name.into(),
            guid: guid.into(),
            device_type,
        }
    }

    /// Returns the transport the device is attached through.
    #[must_use]
    pub const fn transport(&self) -> InterfaceType {
        self.device_type.interface()
    }
}

/// A 6-byte bluetooth address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BluetoothAddress([u8; BLUETOOTH_ADDRESS_LEN]);

impl BluetoothAddress {
    /// Tries to create an address from bytes.
    ///
    /// Returns `None` if the slice is not exactly 6 bytes.
    #[must_use]
    pub fn try_from_bytes(bytes: &[u8]) -> Option<Self> {
        let addr: [u8; BLUETOOTH_ADDRESS_LEN] = bytes.try_into().ok()?;
        Some(Self(addr))
    }

    /// Returns the address as a byte slice.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the address as a hex string without separators.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for BluetoothAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BluetoothAddress({self})")
    }
}

impl fmt::Display for BluetoothAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex::encode_upper(self.0);
        for (i, pair) in hex.as_bytes().chunks(2).enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            f.write_str(std::str::from_utf8(pair).map_err(|_| fmt::Error)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_parts() {
        let ty = DeviceType::SCANNER_D750;
        assert_eq!(ty.as_raw(), (3 << 16) | 10);
        assert_eq!(ty.interface(), InterfaceType::Bluetooth);
        assert_eq!(ty.product(), 10);
        assert!(!ty.is_device_manager());
    }

    #[test]
    fn test_ble_manager_class() {
        let ty = DeviceType::BLE_MANAGER;
        assert_eq!(ty.as_raw(), (1 << 24) | (5 << 16) | 1);
        assert_eq!(ty.class(), DeviceClass::DeviceManager);
        assert_eq!(ty.interface(), InterfaceType::Ble);
    }

    #[test]
    fn test_device_info_transport() {
        let info = DeviceInfo::new("Scanner-1", "guid-1", DeviceType::SOFT_SCAN);
        assert_eq!(info.transport(), InterfaceType::None);
    }

    #[test]
    fn test_bluetooth_address_display() {
        let addr = BluetoothAddress::try_from_bytes(&[0x00, 0x06, 0x66, 0xAB, 0xcd, 0x01]).unwrap();
        assert_eq!(addr.to_string(), "00:06:66:AB:CD:01");
        assert_eq!(addr.to_hex(), "000666abcd01");
        assert!(BluetoothAddress::try_from_bytes(&[1, 2, 3]).is_none());
    }
}
