//! Decoded data and data source types.

use bytes::Bytes;

/// Identifier of a symbology (or RFID/NFC tag type) known to the runtime.
///
/// The numbering belongs to the runtime; this layer only carries it.
pub type DataSourceId = u32;

/// Data read from a barcode or tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedData {
    /// Symbology the data was decoded with.
    pub data_source_id: DataSourceId,
    /// Human readable symbology name.
    pub data_source_name: String,
    /// Raw decoded bytes.
    pub data: Bytes,
}

impl DecodedData {
    /// Creates decoded data.
    #[must_use]
    pub fn new(data_source_id: DataSourceId, name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            data_source_id,
            data_source_name: name.into(),
            data: data.into(),
        }
    }

    /// Returns the data as UTF-8 text, if it is valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Whether a data source is enabled on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DataSourceStatus {
    /// Disabled.
    #[default]
    Disabled = 0,
    /// Enabled.
    Enabled = 1,
    /// Not supported by the device.
    NotSupported = 2,
}

impl DataSourceStatus {
    /// Parses a status from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            1 => Self::Enabled,
            2 => Self::NotSupported,
            _ => Self::Disabled,
        }
    }
}

/// Data source description used to query or toggle a symbology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSource {
    /// Symbology identifier.
    pub id: DataSourceId,
    /// Current (or requested) status.
    pub status: DataSourceStatus,
    /// Symbology name, filled in by the runtime on queries.
    pub name: String,
}

impl DataSource {
    /// Creates a data source request for the given id.
    #[must_use]
    pub fn new(id: DataSourceId, status: DataSourceStatus) -> Self {
        Self {
            id,
            status,
            name: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoded_data_as_str() {
        let data = DecodedData::new(17, "Code 128", Bytes::from_static(b"12345"));
        assert_eq!(data.as_str(), Some("12345"));

        let binary = DecodedData::new(17, "Code 128", vec![0xFF, 0xFE]);
        assert_eq!(binary.as_str(), None);
    }

    #[test]
    fn test_data_source_status() {
        assert_eq!(DataSourceStatus::from_byte(1), DataSourceStatus::Enabled);
        assert_eq!(DataSourceStatus::from_byte(9), DataSourceStatus::Disabled);
    }
}
