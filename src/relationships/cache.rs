//! Association cache - per-source-instance memorized resolution results
//!
//! One cache lives inside each relationship definition; entries are keyed
//! by source instance identity and never outlive the owning instance's
//! request scope. Reads and writes are guarded but not atomic across a
//! read-then-write sequence; callers needing that must synchronize.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::record::{InstanceId, Record};

#[derive(Debug, Default)]
pub(crate) struct AssociationCache {
    entries: RwLock<HashMap<InstanceId, Vec<Record>>>,
}

impl AssociationCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cached collection for the instance, if `get`/`set` already ran
    pub(crate) fn fetch(&self, instance: InstanceId) -> Option<Vec<Record>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&instance)
            .cloned()
    }

    /// Overwrite the cached collection for the instance
    pub(crate) fn store(&self, instance: InstanceId, records: Vec<Record>) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(instance, records);
    }

    pub(crate) fn contains(&self, instance: InstanceId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&instance)
    }

    /// Drop the instance's entry; returns whether one existed
    pub(crate) fn remove(&self, instance: InstanceId) -> bool {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&instance)
            .is_some()
    }
}
