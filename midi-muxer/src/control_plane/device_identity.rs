//! Pointer identity keying for devices.

use crate::device::Device;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Hashes and compares an `Arc<dyn Device>` by the allocation it points at.
///
/// Only the data pointer takes part: two `Arc<dyn Device>` built from the same
/// allocation through different vtables are still the same device.
#[derive(Clone)]
pub(crate) struct DeviceIdentityKey {
    device: Arc<dyn Device>,
}

impl DeviceIdentityKey {
    pub(crate) fn new(device: Arc<dyn Device>) -> Self {
        Self { device }
    }

    fn address(&self) -> *const () {
        Arc::as_ptr(&self.device) as *const ()
    }
}

impl Hash for DeviceIdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl PartialEq for DeviceIdentityKey {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.address(), other.address())
    }
}

impl Eq for DeviceIdentityKey {}

impl Debug for DeviceIdentityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceIdentityKey")
            .field("device", &self.device.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::DeviceIdentityKey;
    use crate::device::Device;
    use crate::test_support::StubDevice;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn same_allocation_is_same_key() {
        let device: Arc<dyn Device> = StubDevice::input("keys");

        assert_eq!(
            DeviceIdentityKey::new(device.clone()),
            DeviceIdentityKey::new(device)
        );
    }

    #[test]
    fn equal_names_on_distinct_devices_are_distinct_keys() {
        let first: Arc<dyn Device> = StubDevice::input("keys");
        let second: Arc<dyn Device> = StubDevice::input("keys");

        let keys: HashSet<_> = [
            DeviceIdentityKey::new(first.clone()),
            DeviceIdentityKey::new(second),
            DeviceIdentityKey::new(first),
        ]
        .into_iter()
        .collect();

        assert_eq!(keys.len(), 2);
    }
}
