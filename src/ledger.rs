//! Durable bookkeeping of reload attempts per loader identity.
//!
//! Persisted as a JSON array of `[key, count]` pairs under a single storage
//! key. Pairs rather than an object keyed by arbitrary strings: loader
//! identities are free-form text and must never collide with reserved
//! property names in the medium.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::store::ReloadStore;

/// Persisted mapping from loader identity to reload count.
///
/// Every operation is fail-open: corrupt, missing, or unreadable data
/// degrades to empty history with a log line. The ledger exists to keep the
/// recovery path alive and must never be the thing that breaks it.
#[derive(Clone)]
pub struct ReloadLedger {
    store: Rc<dyn ReloadStore>,
    storage_key: String,
}

impl ReloadLedger {
    pub fn new(store: Rc<dyn ReloadStore>, storage_key: impl Into<String>) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
        }
    }

    /// Storage key this ledger persists under.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Load the persisted counts. Absent value means empty history.
    ///
    /// Individually malformed entries are dropped rather than rejecting the
    /// whole read; duplicate keys collapse with the last pair winning.
    pub fn read(&self) -> BTreeMap<String, u32> {
        let raw = match self.store.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(err) => {
                log::warn!("reload ledger unreadable, treating as empty: {err}");
                return BTreeMap::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("reload ledger corrupt, starting fresh: {err}");
                return BTreeMap::new();
            }
        };

        let mut counts = BTreeMap::new();
        for entry in entries {
            match serde_json::from_value::<(String, u32)>(entry) {
                Ok((key, count)) => {
                    counts.insert(key, count);
                }
                Err(err) => log::warn!("dropping malformed reload ledger entry: {err}"),
            }
        }
        counts
    }

    /// Reload count recorded for `key`. Absent means zero.
    pub fn count(&self, key: &str) -> u32 {
        self.read().get(key).copied().unwrap_or(0)
    }

    /// Record one more reload for `key`.
    pub fn increment(&self, key: &str) {
        let mut counts = self.read();
        *counts.entry(key.to_string()).or_insert(0) += 1;
        self.persist(&counts);
    }

    /// Forget `key`. No-op if it was never recorded.
    pub fn remove(&self, key: &str) {
        let mut counts = self.read();
        if counts.remove(key).is_some() {
            self.persist(&counts);
        }
    }

    fn persist(&self, counts: &BTreeMap<String, u32>) {
        // BTreeMap iteration keeps the serialized pair order deterministic.
        let pairs: Vec<(&str, u32)> = counts.iter().map(|(key, &count)| (key.as_str(), count)).collect();
        match serde_json::to_string(&pairs) {
            Ok(json) => {
                if let Err(err) = self.store.set(&self.storage_key, &json) {
                    log::warn!("reload ledger not persisted: {err}");
                }
            }
            Err(err) => log::warn!("reload ledger not serialized: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const KEY: &str = "test_reload_ledger";

    fn ledger_with_store() -> (ReloadLedger, Rc<MemoryStore>) {
        let store = Rc::new(MemoryStore::new());
        (ReloadLedger::new(store.clone(), KEY), store)
    }

    #[test]
    fn test_absent_value_reads_empty() {
        let (ledger, _) = ledger_with_store();
        assert!(ledger.read().is_empty());
        assert_eq!(ledger.count("a"), 0);
    }

    #[test]
    fn test_increment_then_read() {
        let (ledger, _) = ledger_with_store();
        ledger.increment("a");
        assert_eq!(ledger.count("a"), 1);
        ledger.increment("a");
        assert_eq!(ledger.count("a"), 2);
        // Other keys unaffected
        assert_eq!(ledger.count("b"), 0);
    }

    #[test]
    fn test_remove_deletes_entry() {
        let (ledger, store) = ledger_with_store();
        ledger.increment("a");
        ledger.remove("a");
        // Absent, not merely zero
        assert!(!ledger.read().contains_key("a"));
        assert_eq!(store.get(KEY).unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (ledger, store) = ledger_with_store();
        ledger.remove("never-seen");
        // Nothing was persisted for a no-op remove
        assert_eq!(store.get(KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_value_reads_empty() {
        let (ledger, store) = ledger_with_store();
        store.set(KEY, "definitely not json").unwrap();
        assert!(ledger.read().is_empty());

        // The ledger still works after seeing corruption
        ledger.increment("a");
        assert_eq!(ledger.count("a"), 1);
    }

    #[test]
    fn test_wrong_shape_reads_empty() {
        let (ledger, store) = ledger_with_store();
        store.set(KEY, r#"{"a": 1}"#).unwrap();
        assert!(ledger.read().is_empty());
    }

    #[test]
    fn test_malformed_entries_are_filtered() {
        let (ledger, store) = ledger_with_store();
        store
            .set(KEY, r#"[["a", 2], ["b", "x"], 3, ["c", 1], ["d", -1]]"#)
            .unwrap();
        let counts = ledger.read();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("a"), Some(&2));
        assert_eq!(counts.get("c"), Some(&1));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let (ledger, store) = ledger_with_store();
        store.set(KEY, r#"[["a", 1], ["a", 5]]"#).unwrap();
        assert_eq!(ledger.count("a"), 5);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let (ledger, store) = ledger_with_store();
        ledger.increment("b");
        ledger.increment("a");
        // Pairs come out in key order regardless of insertion order
        assert_eq!(
            store.get(KEY).unwrap(),
            Some(r#"[["a",1],["b",1]]"#.to_string())
        );
    }

    #[test]
    fn test_roundtrip_is_lossless() {
        let (ledger, _) = ledger_with_store();
        ledger.increment("a");
        ledger.increment("a");
        ledger.increment("b");

        let first = ledger.read();
        // Re-reading the persisted form yields the same mapping
        assert_eq!(ledger.read(), first);
        assert_eq!(first.get("a"), Some(&2));
        assert_eq!(first.get("b"), Some(&1));
    }

    #[test]
    fn test_ledgers_share_state_through_store() {
        let store = Rc::new(MemoryStore::new());
        let one = ReloadLedger::new(store.clone(), KEY);
        let two = ReloadLedger::new(store, KEY);

        one.increment("a");
        assert_eq!(two.count("a"), 1);
    }
}
