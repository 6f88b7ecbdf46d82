//! Anonymous device identity.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};
use tribute_shared::constants::{DEVICE_ID_KEY, DEVICE_ID_PREFIX};
use tribute_shared::kv::KeyValueStore;
use tribute_shared::DeviceId;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random lowercase base-36 string of `len` characters.
pub(crate) fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `device_<unix millis>_<6 base36 chars>`
pub fn generate_device_id() -> DeviceId {
    DeviceId::new(format!(
        "{DEVICE_ID_PREFIX}_{}_{}",
        Utc::now().timestamp_millis(),
        random_base36(6)
    ))
}

/// Hands out the device identity, creating and persisting it on first use.
#[derive(Clone)]
pub struct DeviceIdentityProvider {
    store: Arc<dyn KeyValueStore>,
}

impl DeviceIdentityProvider {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The persisted identity, or a fresh one stored before returning.
    ///
    /// A failing store is logged, not propagated. When the read fails the
    /// caller gets a throwaway id and the stored one is left alone.
    pub fn device_id(&self) -> DeviceId {
        match self.store.get(DEVICE_ID_KEY) {
            Ok(Some(existing)) if !existing.trim().is_empty() => {
                return DeviceId::new(existing);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Failed to read device id, using a transient one");
                return generate_device_id();
            }
        }

        let id = generate_device_id();
        match self.store.set(DEVICE_ID_KEY, id.as_str()) {
            Ok(()) => debug!(device_id = %id, "Generated device id"),
            Err(e) => warn!(error = %e, "Failed to persist device id"),
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FlakyStore;
    use tribute_shared::MemoryStore;

    #[test]
    fn generated_ids_have_expected_shape() {
        let id = generate_device_id();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "device");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn id_is_stable_per_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let provider = DeviceIdentityProvider::new(Arc::clone(&store));

        let first = provider.device_id();
        assert_eq!(provider.device_id(), first);

        let reloaded = DeviceIdentityProvider::new(Arc::clone(&store));
        assert_eq!(reloaded.device_id(), first);
        assert_eq!(store.get(DEVICE_ID_KEY).unwrap().as_deref(), Some(first.as_str()));
    }

    #[test]
    fn separate_stores_get_separate_ids() {
        let a = DeviceIdentityProvider::new(Arc::new(MemoryStore::new()));
        let b = DeviceIdentityProvider::new(Arc::new(MemoryStore::new()));
        assert_ne!(a.device_id(), b.device_id());
    }

    #[test]
    fn read_failure_keeps_stored_id() {
        let store = Arc::new(FlakyStore::default());
        let provider = DeviceIdentityProvider::new(store.clone());
        let original = provider.device_id();

        store.fail_next_reads(1);
        let transient = provider.device_id();
        assert_ne!(transient, original);
        assert_eq!(store.get(DEVICE_ID_KEY).unwrap().as_deref(), Some(original.as_str()));

        assert_eq!(provider.device_id(), original);
    }
}
