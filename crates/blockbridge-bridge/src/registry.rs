//! Device registry
//!
//! Process-wide association from a config identity to the live device
//! object (and optional traversal visitor) backing it. Entries are
//! non-owning: the host manages device lifetimes, the registry only stores
//! the lookup relation.
//!
//! Registration and removal happen at mount/unmount frequency; lookups
//! happen on every block operation, so both maps are sharded concurrent
//! maps rather than a single lock.

use std::sync::Arc;

use blockbridge_common::ConfigId;
use blockbridge_device::{BlockDevice, BlockVisitor};
use dashmap::DashMap;
use tracing::debug;

/// Lookup relation from config identity to backing device objects.
///
/// Safe to query concurrently with registration of *unrelated* configs.
/// Concurrent register/unregister on the *same* config is a caller error:
/// the outcome is whichever write lands last, nothing worse, but callers
/// must serialize their own mount/unmount per config.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: DashMap<ConfigId, Arc<dyn BlockDevice>>,
    visitors: DashMap<ConfigId, Arc<dyn BlockVisitor>>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `device` as the backend for `config`.
    ///
    /// Overwrites any previous entry; callers must not register a second
    /// device for a config without unregistering the first.
    pub fn register(&self, config: ConfigId, device: Arc<dyn BlockDevice>) {
        debug!(%config, "registering block device");
        self.devices.insert(config, device);
    }

    /// Look up the device registered for `config`.
    #[must_use]
    pub fn lookup(&self, config: ConfigId) -> Option<Arc<dyn BlockDevice>> {
        self.devices.get(&config).map(|entry| Arc::clone(&entry))
    }

    /// Remove the device entry for `config`. Later lookups miss.
    pub fn unregister(&self, config: ConfigId) {
        debug!(%config, "unregistering block device");
        self.devices.remove(&config);
    }

    /// Register `visitor` as the traversal callback target for `config`.
    ///
    /// Same overwrite contract as [`DeviceRegistry::register`].
    pub fn register_visitor(&self, config: ConfigId, visitor: Arc<dyn BlockVisitor>) {
        debug!(%config, "registering traversal visitor");
        self.visitors.insert(config, visitor);
    }

    /// Look up the traversal visitor registered for `config`.
    #[must_use]
    pub fn visitor(&self, config: ConfigId) -> Option<Arc<dyn BlockVisitor>> {
        self.visitors.get(&config).map(|entry| Arc::clone(&entry))
    }

    /// Remove the traversal visitor entry for `config`.
    pub fn unregister_visitor(&self, config: ConfigId) {
        debug!(%config, "unregistering traversal visitor");
        self.visitors.remove(&config);
    }

    /// Number of configs with a registered device.
    #[must_use]
    pub fn registered_devices(&self) -> usize {
        self.devices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbridge_device::MemoryBlockDevice;

    #[test]
    fn test_lookup_miss() {
        let registry = DeviceRegistry::new();
        assert!(registry.lookup(ConfigId::next()).is_none());
    }

    #[test]
    fn test_register_lookup_unregister() {
        let registry = DeviceRegistry::new();
        let config = ConfigId::next();
        let device = Arc::new(MemoryBlockDevice::new(16, 4));

        registry.register(config, device);
        assert!(registry.lookup(config).is_some());
        assert_eq!(registry.registered_devices(), 1);

        registry.unregister(config);
        assert!(registry.lookup(config).is_none());
        assert_eq!(registry.registered_devices(), 0);
    }

    #[test]
    fn test_register_overwrites() {
        let registry = DeviceRegistry::new();
        let config = ConfigId::next();

        let first = Arc::new(MemoryBlockDevice::new(16, 4));
        let second = Arc::new(MemoryBlockDevice::new(32, 8));
        registry.register(config, first);
        registry.register(config, second);

        assert_eq!(registry.registered_devices(), 1);
    }

    #[test]
    fn test_entries_are_independent() {
        let registry = DeviceRegistry::new();
        let a = ConfigId::next();
        let b = ConfigId::next();

        registry.register(a, Arc::new(MemoryBlockDevice::new(16, 4)));
        registry.register(b, Arc::new(MemoryBlockDevice::new(16, 4)));
        registry.unregister(a);

        assert!(registry.lookup(a).is_none());
        assert!(registry.lookup(b).is_some());
    }
}
