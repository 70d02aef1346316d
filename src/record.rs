//! Record instances - runtime representation of typed records
//!
//! A `Record` carries its model name, an attribute map, and a
//! process-unique instance identity. Association caches are scoped to
//! that identity, not to attribute values, so two records with equal
//! attributes still resolve their associations independently.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an in-memory record instance, used as the association cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A record instance of a named model
///
/// Cloning preserves the instance identity: a clone is a handle to the
/// same logical instance and shares its association state. Records
/// materialized by a store get fresh identities via [`Record::new`].
#[derive(Debug, Clone)]
pub struct Record {
    model: String,
    attributes: HashMap<String, Value>,
    instance_id: InstanceId,
}

impl Record {
    /// Create a new, empty record of the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            attributes: HashMap::new(),
            instance_id: InstanceId::next(),
        }
    }

    /// Create a record of the given model from raw attributes
    pub fn with_attributes(model: impl Into<String>, attributes: HashMap<String, Value>) -> Self {
        Self {
            model: model.into(),
            attributes,
            instance_id: InstanceId::next(),
        }
    }

    /// Set an attribute, consuming and returning the record
    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// The record's model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The record's in-memory instance identity
    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    /// Check whether this record is an instance of the given model
    pub fn is_instance_of(&self, model: &str) -> bool {
        self.model == model
    }

    /// Get an attribute value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute value
    pub fn set_attr(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// All attributes of this record
    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }
}

// Equality is by model and attribute values; instance identity is an
// in-memory concern and does not participate.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.model == other.model && self.attributes == other.attributes
    }
}
