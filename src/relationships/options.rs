//! Relationship configuration - recognized construction options
//!
//! Options carry explicit key overrides, the through/via hops for
//! composed relationships, and declared cardinality bounds. Keys default
//! to the conventional `id` on the source side and `<model>_id` on the
//! target side when not given.

use std::sync::Arc;

use crate::key::Key;

use super::traits::Relationship;

/// Conventional foreign key attribute for a model: `person_id` for `Person`
pub fn default_foreign_key(model: &str) -> String {
    format!("{}_id", model.to_lowercase())
}

/// Configuration accepted by relationship constructors
#[derive(Debug, Clone, Default)]
pub struct RelationshipOptions {
    source_key: Option<Key>,
    target_key: Option<Key>,
    through: Option<(Arc<dyn Relationship>, Arc<dyn Relationship>)>,
    min: Option<usize>,
    max: Option<usize>,
}

impl RelationshipOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the key extracted from source instances
    pub fn with_source_key(mut self, key: Key) -> Self {
        self.source_key = Some(key);
        self
    }

    /// Override the key matched against target instances
    pub fn with_target_key(mut self, key: Key) -> Self {
        self.target_key = Some(key);
        self
    }

    /// Compose through a join model: `through` is the hop from the source
    /// to the join model, `via` the hop from the join model to the target
    pub fn through(mut self, through: Arc<dyn Relationship>, via: Arc<dyn Relationship>) -> Self {
        self.through = Some((through, via));
        self
    }

    /// Declared minimum cardinality
    pub fn with_min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    /// Declared maximum cardinality, applied as a fetch limit by
    /// collection relationships
    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn min(&self) -> Option<usize> {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Whether a through chain was configured
    pub fn has_through(&self) -> bool {
        self.through.is_some()
    }

    pub(crate) fn take_through(
        &mut self,
    ) -> Option<(Arc<dyn Relationship>, Arc<dyn Relationship>)> {
        self.through.take()
    }

    /// The configured source key, or the conventional `id`
    pub(crate) fn resolved_source_key(&self) -> Key {
        self.source_key.clone().unwrap_or_else(|| Key::single("id"))
    }

    /// The configured target key, or the conventional foreign key derived
    /// from the source model name
    pub(crate) fn resolved_target_key(&self, source_model: &str) -> Key {
        self.target_key
            .clone()
            .unwrap_or_else(|| Key::single(default_foreign_key(source_model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_foreign_key() {
        assert_eq!(default_foreign_key("Person"), "person_id");
        assert_eq!(default_foreign_key("Team"), "team_id");
    }

    #[test]
    fn test_key_defaults() {
        let options = RelationshipOptions::new();
        assert_eq!(options.resolved_source_key(), Key::single("id"));
        assert_eq!(
            options.resolved_target_key("Person"),
            Key::single("person_id")
        );
    }

    #[test]
    fn test_key_overrides() {
        let options = RelationshipOptions::new()
            .with_source_key(Key::single("uuid"))
            .with_target_key(Key::single("owner_uuid"));

        assert_eq!(options.resolved_source_key(), Key::single("uuid"));
        assert_eq!(
            options.resolved_target_key("Person"),
            Key::single("owner_uuid")
        );
    }

    #[test]
    fn test_cardinality_bounds() {
        let options = RelationshipOptions::new().with_min(1).with_max(5);
        assert_eq!(options.min(), Some(1));
        assert_eq!(options.max(), Some(5));
    }
}
