//! Connected devices and device managers, keyed by connection handle.

use std::collections::HashMap;

use crate::channel::ConnectionHandle;
use crate::device::{Device, DeviceManager};

/// Devices and device managers currently connected.
///
/// A handle is present in at most one of the two maps.
#[derive(Debug, Default)]
pub struct Registry {
    devices: HashMap<ConnectionHandle, Device>,
    managers: HashMap<ConnectionHandle, DeviceManager>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a device under its handle.
    ///
    /// Returns `false` and leaves the registry unchanged if the handle is
    /// already registered. The existing registration is kept.
    pub fn insert_device(&mut self, device: Device) -> bool {
        let handle = device.handle();
        if self.managers.contains_key(&handle) {
            tracing::warn!(%handle, "handle already registered as a device manager");
            return false;
        }
        if self.devices.contains_key(&handle) {
            tracing::warn!(%handle, "handle already registered as a device");
            return false;
        }
        self.devices.insert(handle, device);
        true
    }

    /// Removes and returns the device with `handle`.
    pub fn remove_device(&mut self, handle: ConnectionHandle) -> Option<Device> {
        self.devices.remove(&handle)
    }

    /// Records a device manager under its handle.
    ///
    /// Returns `false` and leaves the registry unchanged if the handle is
    /// already registered. The existing registration is kept.
    pub fn insert_manager(&mut self, manager: DeviceManager) -> bool {
        let handle = manager.handle();
        if self.devices.contains_key(&handle) {
            tracing::warn!(%handle, "handle already registered as a device");
            return false;
        }
        if self.managers.contains_key(&handle) {
            tracing::warn!(%handle, "handle already registered as a device manager");
            return false;
        }
        self.managers.insert(handle, manager);
        true
    }

    /// Removes and returns the device manager with `handle`.
    pub fn remove_manager(&mut self, handle: ConnectionHandle) -> Option<DeviceManager> {
        self.managers.remove(&handle)
    }

    /// Looks up a device.
    #[must_use]
    pub fn device(&self, handle: ConnectionHandle) -> Option<&Device> {
        self.devices.get(&handle)
    }

    /// Looks up a device manager.
    #[must_use]
    pub fn manager(&self, handle: ConnectionHandle) -> Option<&DeviceManager> {
        self.managers.get(&handle)
    }

    /// Snapshot of every device, ordered by handle.
    #[must_use]
    pub fn devices(&self) -> Vec<Device> {
        let mut devices: Vec<_> = self.devices.values().cloned().collect();
        devices.sort_by_key(Device::handle);
        devices
    }

    /// Snapshot of every device manager, ordered by handle.
    #[must_use]
    pub fn managers(&self) -> Vec<DeviceManager> {
        let mut managers: Vec<_> = self.managers.values().cloned().collect();
        managers.sort_by_key(|manager| manager.handle());
        managers
    }

    /// Empties both maps, returning what they held.
    pub fn clear(&mut self) -> (Vec<Device>, Vec<DeviceManager>) {
        let devices = self.devices.drain().map(|(_, device)| device).collect();
        let managers = self.managers.drain().map(|(_, manager)| manager).collect();
        (devices, managers)
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.managers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::BoxFuture;

    use super::*;
    use crate::channel::PropertyChannel;
    use crate::error::Result;
    use crate::event::DeliveryContext;
    use crate::property::{PropertyId, PropertyValue};
    use crate::types::{DeviceInfo, DeviceType};

    struct Fixed(ConnectionHandle);

    impl PropertyChannel for Fixed {
        fn handle(&self) -> ConnectionHandle {
            self.0
        }

        fn get_property(
            &self,
            _id: PropertyId,
            _arg: PropertyValue,
        ) -> BoxFuture<'_, Result<PropertyValue>> {
            Box::pin(async { Ok(PropertyValue::None) })
        }

        fn set_property(&self, _id: PropertyId, _value: PropertyValue) -> BoxFuture<'_, Result<()>> {
            Box::pin(async { Ok(()) })
        }

        fn open_device(&self, _guid: String) -> BoxFuture<'_, Result<Arc<dyn PropertyChannel>>> {
            Box::pin(async { Err(crate::error::Error::InvalidHandle) })
        }

        fn close(&self) -> BoxFuture<'_, Result<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn device(raw: u64, name: &str) -> Device {
        Device::new(
            DeviceInfo::new(name, format!("guid-{raw}"), DeviceType::SCANNER_7),
            Arc::new(Fixed(ConnectionHandle::from_raw(raw))),
            DeliveryContext::Inline,
        )
    }

    fn manager(raw: u64) -> DeviceManager {
        DeviceManager::new(
            DeviceInfo::new("Hub", format!("guid-{raw}"), DeviceType::BLE_MANAGER),
            Arc::new(Fixed(ConnectionHandle::from_raw(raw))),
            DeliveryContext::Inline,
        )
    }

    #[test]
    fn test_insert_lookup_remove() {
        let mut registry = Registry::new();
        assert!(registry.insert_device(device(2, "A")));
        assert!(registry.insert_device(device(3, "B")));

        let h2 = ConnectionHandle::from_raw(2);
        assert_eq!(registry.device(h2).unwrap().name(), "A");
        assert!(registry.manager(h2).is_none());

        let names: Vec<_> = registry
            .devices()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, ["A", "B"]);

        assert!(registry.remove_device(h2).is_some());
        assert!(registry.remove_device(h2).is_none());
        assert_eq!(registry.devices().len(), 1);
    }

    #[test]
    fn test_handle_in_one_map_only() {
        let mut registry = Registry::new();
        assert!(registry.insert_manager(manager(5)));
        assert!(!registry.insert_device(device(5, "Clash")));
        assert!(registry.device(ConnectionHandle::from_raw(5)).is_none());

        assert!(registry.insert_device(device(6, "A")));
        assert!(!registry.insert_manager(manager(6)));
        assert_eq!(registry.managers().len(), 1);
    }

    #[test]
    fn test_duplicate_handle_keeps_first_registration() {
        let mut registry = Registry::new();
        assert!(registry.insert_device(device(2, "First")));
        assert!(!registry.insert_device(device(2, "Second")));
        assert_eq!(
            registry.device(ConnectionHandle::from_raw(2)).unwrap().name(),
            "First"
        );

        let hub = manager(3);
        assert!(registry.insert_manager(hub.clone()));
        assert!(!registry.insert_manager(manager(3)));
        assert_eq!(registry.manager(ConnectionHandle::from_raw(3)), Some(&hub));
    }

    #[test]
    fn test_unknown_handles_yield_none() {
        let mut registry = Registry::new();
        let h = ConnectionHandle::from_raw(42);
        assert!(registry.device(h).is_none());
        assert!(registry.remove_manager(h).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear_returns_everything() {
        let mut registry = Registry::new();
        registry.insert_device(device(2, "A"));
        registry.insert_manager(manager(3));

        let (devices, managers) = registry.clear();
        assert_eq!(devices.len(), 1);
        assert_eq!(managers.len(), 1);
        assert!(registry.is_empty());
    }
}
