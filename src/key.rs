//! Key system - ordered attribute tuples for record identity and matching
//!
//! A `Key` names the attributes that identify a record uniquely or by
//! foreign reference. Validity is checked against actual instance data:
//! null, zero integers, empty strings, and the nil UUID all count as
//! unset components.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::record::Record;

/// An ordered tuple of attribute names identifying a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    attributes: Vec<String>,
}

impl Key {
    /// Create a key over the given attribute names, in order
    pub fn new(attributes: Vec<String>) -> Self {
        Self { attributes }
    }

    /// Create a single-attribute key
    pub fn single(attribute: impl Into<String>) -> Self {
        Self {
            attributes: vec![attribute.into()],
        }
    }

    /// The attribute names this key is made of
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Number of key components
    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    /// Extract this key's component values from a record instance
    ///
    /// Missing attributes extract as `Value::Null`, which makes the
    /// resulting tuple invalid rather than erroring.
    pub fn get(&self, record: &Record) -> Vec<Value> {
        self.attributes
            .iter()
            .map(|attr| record.get(attr).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Check whether an extracted value tuple is a fully set key
    pub fn valid(&self, values: &[Value]) -> bool {
        values.len() == self.arity() && !values.is_empty() && values.iter().all(component_set)
    }
}

/// A key component counts as set unless it is null, a zero integer, an
/// empty string, or the nil UUID.
fn component_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Number(n) => n.as_i64() != Some(0) && n.as_u64() != Some(0),
        Value::String(s) => {
            if s.is_empty() {
                return false;
            }
            match Uuid::parse_str(s) {
                Ok(uuid) => !uuid.is_nil(),
                Err(_) => true,
            }
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_extraction() {
        let record = Record::new("Person")
            .with_attr("id", json!(7))
            .with_attr("name", json!("Ada"));

        let key = Key::single("id");
        assert_eq!(key.get(&record), vec![json!(7)]);

        let missing = Key::single("tenant_id");
        assert_eq!(missing.get(&record), vec![Value::Null]);
    }

    #[test]
    fn test_key_validity() {
        let key = Key::single("id");
        assert!(key.valid(&[json!(1)]));
        assert!(!key.valid(&[Value::Null]));
        assert!(!key.valid(&[json!(0)]));
        assert!(!key.valid(&[json!("")]));
        assert!(key.valid(&[json!("ada")]));
    }

    #[test]
    fn test_uuid_components() {
        let key = Key::single("id");
        assert!(!key.valid(&[json!(Uuid::nil().to_string())]));
        assert!(key.valid(&[json!(Uuid::new_v4().to_string())]));
    }

    #[test]
    fn test_composite_key_validity() {
        let key = Key::new(vec!["tenant_id".to_string(), "user_id".to_string()]);
        assert_eq!(key.arity(), 2);
        assert!(key.valid(&[json!(1), json!(2)]));
        assert!(!key.valid(&[json!(1), Value::Null]));
        // Arity mismatch is never valid
        assert!(!key.valid(&[json!(1)]));
    }
}
