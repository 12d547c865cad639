//! Persistent UI preferences.
//!
//! The UI keeps its own small key/value namespace (`ui_settings`) apart from
//! the mesh engine's node preferences: backlight brightness, theme colours
//! and the auto-off choice.
//!
//! With the `embedded` feature, [`FlashSettingsStore`] persists the cache to
//! internal flash via `sequential-storage`.
//!
//! Storage layout (one map item, key `KEY_UI_SETTINGS`):
//!   [count] then per entry [ns_len][ns bytes][key_len][key bytes][value]

use heapless::{String, Vec};

use crate::config::{
    self, KEY_AUTO_OFF, KEY_BRIGHTNESS, KEY_MAIN_COLOR, KEY_SECONDARY_COLOR, UI_SETTINGS_NAMESPACE,
};
use crate::error::StoreError;
use crate::ui::theme;

/// Namespaced byte-valued key/value store.
pub trait SettingsStore {
    /// Stored value, `Ok(None)` when the key was never written.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<u8>, StoreError>;

    fn set(&mut self, namespace: &str, key: &str, value: u8) -> Result<(), StoreError>;

    /// Stored value or `default` when missing or unreadable.
    fn get_or(&self, namespace: &str, key: &str, default: u8) -> u8 {
        match self.get(namespace, key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!("Settings: read {} failed: {}", key, e);
                default
            }
        }
    }
}

/// Auto-off choices offered under Other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AutoOff {
    Secs30,
    Min1,
    Min5,
    Min10,
    Never,
}

impl AutoOff {
    pub const ALL: [AutoOff; 5] = [
        AutoOff::Secs30,
        AutoOff::Min1,
        AutoOff::Min5,
        AutoOff::Min10,
        AutoOff::Never,
    ];

    /// Timeout in milliseconds; 0 means never.
    pub fn millis(self) -> u64 {
        match self {
            AutoOff::Secs30 => 30_000,
            AutoOff::Min1 => 60_000,
            AutoOff::Min5 => config::AUTO_OFF_MILLIS,
            AutoOff::Min10 => 600_000,
            AutoOff::Never => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AutoOff::Secs30 => "30 sec",
            AutoOff::Min1 => "1 min",
            AutoOff::Min5 => "5 min",
            AutoOff::Min10 => "10 min",
            AutoOff::Never => "Never",
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() as usize + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() as usize + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl Default for AutoOff {
    fn default() -> Self {
        AutoOff::Min5
    }
}

/// UI preferences persisted in the `ui_settings` namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiPrefs {
    pub brightness: u8,
    pub main_color: u8,
    pub secondary_color: u8,
    pub auto_off: AutoOff,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            brightness: config::DEFAULT_BRIGHTNESS,
            main_color: config::DEFAULT_MAIN_COLOR,
            secondary_color: config::DEFAULT_SECONDARY_COLOR,
            auto_off: AutoOff::default(),
        }
    }
}

impl UiPrefs {
    /// Load from `store`. Missing, unreadable or out-of-range values fall back to defaults.
    pub fn load<S: SettingsStore + ?Sized>(store: &S) -> Self {
        let defaults = Self::default();
        let ns = UI_SETTINGS_NAMESPACE;

        let color = |key: &str, default: u8| {
            let value = store.get_or(ns, key, default);
            if (value as usize) < theme::COLORS.len() {
                value
            } else {
                warn!("Settings: {} out of range ({}), using default", key, value);
                default
            }
        };

        let prefs = Self {
            brightness: store.get_or(ns, KEY_BRIGHTNESS, defaults.brightness),
            main_color: color(KEY_MAIN_COLOR, defaults.main_color),
            secondary_color: color(KEY_SECONDARY_COLOR, defaults.secondary_color),
            auto_off: AutoOff::from_index(store.get_or(ns, KEY_AUTO_OFF, defaults.auto_off.index()))
                .unwrap_or(defaults.auto_off),
        };
        debug!(
            "Settings: loaded brightness={} main={} sec={}",
            prefs.brightness,
            prefs.main_color,
            prefs.secondary_color
        );
        prefs
    }

    /// Write theme values (brightness and both colours).
    pub fn save_theme<S: SettingsStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        let ns = UI_SETTINGS_NAMESPACE;
        store.set(ns, KEY_BRIGHTNESS, self.brightness)?;
        store.set(ns, KEY_MAIN_COLOR, self.main_color)?;
        store.set(ns, KEY_SECONDARY_COLOR, self.secondary_color)?;
        Ok(())
    }

    pub fn save_auto_off<S: SettingsStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store.set(UI_SETTINGS_NAMESPACE, KEY_AUTO_OFF, self.auto_off.index())
    }
}

/// Maximum number of cached settings entries.
pub const MAX_SETTINGS: usize = 16;

/// Longest namespace or key name accepted by the cache.
const MAX_KEY_LEN: usize = 16;

/// Maximum serialized size of the whole cache.
#[cfg_attr(not(feature = "embedded"), allow(dead_code))]
const MAX_RECORD_SIZE: usize = 1 + MAX_SETTINGS * (2 + 2 * MAX_KEY_LEN + 1);

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    namespace: String<MAX_KEY_LEN>,
    key: String<MAX_KEY_LEN>,
    value: u8,
}

#[cfg_attr(not(feature = "embedded"), allow(dead_code))]
impl Entry {
    /// Serialize into `buf`; returns bytes written, 0 if it does not fit.
    fn serialize(&self, buf: &mut [u8]) -> usize {
        let ns = self.namespace.as_bytes();
        let key = self.key.as_bytes();
        let total = 1 + ns.len() + 1 + key.len() + 1;
        if buf.len() < total {
            return 0;
        }

        buf[0] = ns.len() as u8;
        buf[1..1 + ns.len()].copy_from_slice(ns);
        let mut offset = 1 + ns.len();
        buf[offset] = key.len() as u8;
        offset += 1;
        buf[offset..offset + key.len()].copy_from_slice(key);
        offset += key.len();
        buf[offset] = self.value;
        total
    }

    /// Deserialize from the front of `data`; returns the entry and bytes consumed.
    fn deserialize(data: &[u8]) -> Option<(Self, usize)> {
        let ns_len = *data.first()? as usize;
        let ns = data.get(1..1 + ns_len)?;
        let key_len = *data.get(1 + ns_len)? as usize;
        let key_start = 2 + ns_len;
        let key = data.get(key_start..key_start + key_len)?;
        let value = *data.get(key_start + key_len)?;

        let mut namespace = String::new();
        namespace.push_str(core::str::from_utf8(ns).ok()?).ok()?;
        let mut name = String::new();
        name.push_str(core::str::from_utf8(key).ok()?).ok()?;

        Some((
            Self {
                namespace,
                key: name,
                value,
            },
            key_start + key_len + 1,
        ))
    }
}

/// In-memory settings cache, synced with flash.
#[derive(Clone, Debug, Default)]
pub struct FlashSettingsStore {
    entries: Vec<Entry, MAX_SETTINGS>,
    /// Dirty flag - true if cache differs from flash.
    dirty: bool,
}

impl FlashSettingsStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize all entries to a byte buffer.
    #[cfg_attr(not(feature = "embedded"), allow(dead_code))]
    fn serialize_all(&self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }

        // First byte: entry count.
        buf[0] = self.entries.len() as u8;
        let mut offset = 1;

        for entry in &self.entries {
            offset += entry.serialize(&mut buf[offset..]);
        }

        offset
    }

    /// Replace the cache with entries decoded from `data`, stopping at the first bad record.
    #[cfg_attr(not(feature = "embedded"), allow(dead_code))]
    fn deserialize_all(&mut self, data: &[u8]) {
        self.entries.clear();
        let Some((&count, mut rest)) = data.split_first() else {
            return;
        };

        for _ in 0..count {
            let Some((entry, used)) = Entry::deserialize(rest) else {
                warn!("Settings: truncated record, keeping {}", self.entries.len());
                break;
            };
            if self.entries.push(entry).is_err() {
                break;
            }
            rest = &rest[used..];
        }
    }
}

impl SettingsStore for FlashSettingsStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<u8>, StoreError> {
        Ok(self
            .entries
            .iter()
            .find(|e| e.namespace == namespace && e.key == key)
            .map(|e| e.value))
    }

    fn set(&mut self, namespace: &str, key: &str, value: u8) -> Result<(), StoreError> {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.namespace == namespace && e.key == key)
        {
            if existing.value != value {
                existing.value = value;
                self.dirty = true;
            }
            return Ok(());
        }

        let mut ns = String::new();
        ns.push_str(namespace).map_err(|_| StoreError::Unavailable)?;
        let mut name = String::new();
        name.push_str(key).map_err(|_| StoreError::Unavailable)?;
        self.entries
            .push(Entry {
                namespace: ns,
                key: name,
                value,
            })
            .map_err(|_| StoreError::Full)?;
        self.dirty = true;
        Ok(())
    }
}

#[cfg(feature = "embedded")]
mod flash {
    use super::{FlashSettingsStore, MAX_RECORD_SIZE};
    use crate::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
    use crate::error::StoreError;

    /// Flash page size (4 KB).
    const FLASH_PAGE_SIZE: u32 = 4096;

    /// Start address of our storage region.
    const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

    /// End address (exclusive) of our storage region.
    const STORAGE_END: u32 =
        (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

    /// Key for the settings blob in the map storage.
    const KEY_UI_SETTINGS: u8 = 0x01;

    impl FlashSettingsStore {
        /// Async load from flash. A read error leaves an empty cache so defaults apply.
        pub async fn load_from_flash(
            &mut self,
            flash: &mut impl embedded_storage_async::nor_flash::NorFlash,
        ) {
            let flash_range = STORAGE_START..STORAGE_END;
            let mut buf = [0u8; MAX_RECORD_SIZE + 16];

            match sequential_storage::map::fetch_item::<u8, &[u8], _>(
                flash,
                flash_range,
                &mut sequential_storage::cache::NoCache::new(),
                &mut buf,
                &KEY_UI_SETTINGS,
            )
            .await
            {
                Ok(Some(data)) => {
                    self.deserialize_all(data);
                    info!("Settings: loaded {} entries from flash", self.entries.len());
                }
                Ok(None) => {
                    info!("Settings: nothing stored, using defaults");
                    self.entries.clear();
                }
                Err(e) => {
                    error!("Settings: flash read error: {:?}", defmt::Debug2Format(&e));
                    self.entries.clear();
                }
            }
            self.dirty = false;
        }

        /// Persist the cache if anything changed since the last load/save.
        pub async fn save_to_flash(
            &mut self,
            flash: &mut impl embedded_storage_async::nor_flash::NorFlash,
        ) -> Result<(), StoreError> {
            if !self.dirty {
                debug!("Settings: no changes to save");
                return Ok(());
            }

            let flash_range = STORAGE_START..STORAGE_END;
            let mut buf = [0u8; MAX_RECORD_SIZE + 16];
            let mut data_buf = [0u8; MAX_RECORD_SIZE];

            let len = self.serialize_all(&mut data_buf);
            let item = &data_buf[..len];

            match sequential_storage::map::store_item::<u8, &[u8], _>(
                flash,
                flash_range,
                &mut sequential_storage::cache::NoCache::new(),
                &mut buf,
                &KEY_UI_SETTINGS,
                &item,
            )
            .await
            {
                Ok(_) => {
                    info!("Settings: saved {} entries to flash", self.entries.len());
                    self.dirty = false;
                    Ok(())
                }
                Err(e) => {
                    error!("Settings: flash write error: {:?}", defmt::Debug2Format(&e));
                    Err(StoreError::Flash)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl SettingsStore for FailingStore {
        fn get(&self, _: &str, _: &str) -> Result<Option<u8>, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn set(&mut self, _: &str, _: &str, _: u8) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    #[test]
    fn unavailable_store_yields_defaults() {
        let prefs = UiPrefs::load(&FailingStore);
        assert_eq!(prefs, UiPrefs::default());
        assert_eq!(prefs.brightness, 128);
    }

    #[test]
    fn prefs_roundtrip_through_cache() {
        let mut store = FlashSettingsStore::new();
        let prefs = UiPrefs {
            brightness: 200,
            main_color: 3,
            secondary_color: 5,
            auto_off: AutoOff::Never,
        };
        prefs.save_theme(&mut store).unwrap();
        prefs.save_auto_off(&mut store).unwrap();
        assert!(store.is_dirty());
        assert_eq!(UiPrefs::load(&store), prefs);
    }

    #[test]
    fn out_of_range_colour_is_clamped_to_default() {
        let mut store = FlashSettingsStore::new();
        store.set(UI_SETTINGS_NAMESPACE, KEY_MAIN_COLOR, 99).unwrap();
        store.set(UI_SETTINGS_NAMESPACE, KEY_AUTO_OFF, 42).unwrap();
        let prefs = UiPrefs::load(&store);
        assert_eq!(prefs.main_color, config::DEFAULT_MAIN_COLOR);
        assert_eq!(prefs.auto_off, AutoOff::Min5);
    }

    #[test]
    fn rewriting_same_value_stays_clean() {
        let mut store = FlashSettingsStore::new();
        store.set("ns", "k", 1).unwrap();
        store.dirty = false;
        store.set("ns", "k", 1).unwrap();
        assert!(!store.is_dirty());
        store.set("ns", "k", 2).unwrap();
        assert!(store.is_dirty());
    }

    #[test]
    fn cache_serialization_survives_reload() {
        let mut store = FlashSettingsStore::new();
        store.set(UI_SETTINGS_NAMESPACE, KEY_BRIGHTNESS, 77).unwrap();
        store.set("other", "x", 9).unwrap();

        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = store.serialize_all(&mut buf);

        let mut reloaded = FlashSettingsStore::new();
        reloaded.deserialize_all(&buf[..len]);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(UI_SETTINGS_NAMESPACE, KEY_BRIGHTNESS), Ok(Some(77)));
        assert_eq!(reloaded.get("other", "x"), Ok(Some(9)));
    }

    #[test]
    fn truncated_blob_keeps_complete_entries() {
        let mut store = FlashSettingsStore::new();
        store.set("a", "b", 1).unwrap();
        store.set("c", "d", 2).unwrap();
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = store.serialize_all(&mut buf);

        let mut reloaded = FlashSettingsStore::new();
        reloaded.deserialize_all(&buf[..len - 1]);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("c", "d"), Ok(None));
    }

    #[test]
    fn auto_off_cycles_both_ways() {
        assert_eq!(AutoOff::Never.next(), AutoOff::Secs30);
        assert_eq!(AutoOff::Secs30.prev(), AutoOff::Never);
        assert_eq!(AutoOff::Min10.millis(), 600_000);
        assert_eq!(AutoOff::Never.millis(), 0);
    }
}
