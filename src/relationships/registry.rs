//! Relationship registry - per-model storage of named relationships
//!
//! Populated while models are being defined, read-only afterwards. The
//! registry is an explicit value passed by reference to whatever needs
//! lookups; there is no process-global instance.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{AssociationError, AssociationResult};

use super::traits::Relationship;

/// Derive a default target model name by camelizing a relationship name:
/// `address` becomes `Address`, `home_address` becomes `HomeAddress`
pub fn derive_target_model(name: &str) -> String {
    name.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Table of named relationships per model
#[derive(Debug, Clone)]
pub struct RelationshipRegistry {
    relationships: Arc<DashMap<String, HashMap<String, Arc<dyn Relationship>>>>,
}

impl Default for RelationshipRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            relationships: Arc::new(DashMap::new()),
        }
    }

    /// Register a relationship under its source model
    ///
    /// Relationship names are unique per model; defining the same name
    /// twice is a configuration error.
    pub fn define(
        &self,
        model: &str,
        relationship: Arc<dyn Relationship>,
    ) -> AssociationResult<()> {
        let mut model_relationships = self.relationships.entry(model.to_string()).or_default();

        if model_relationships.contains_key(relationship.name()) {
            return Err(AssociationError::Configuration(format!(
                "relationship '{}' is already defined on model '{}'",
                relationship.name(),
                model
            )));
        }

        model_relationships.insert(relationship.name().to_string(), relationship);
        Ok(())
    }

    /// Look up a relationship by model and name
    pub fn get(&self, model: &str, name: &str) -> Option<Arc<dyn Relationship>> {
        self.relationships.get(model)?.get(name).cloned()
    }

    /// Check whether a relationship is defined
    pub fn has(&self, model: &str, name: &str) -> bool {
        self.relationships
            .get(model)
            .map(|relationships| relationships.contains_key(name))
            .unwrap_or(false)
    }

    /// All relationship names defined on a model
    pub fn relationship_names(&self, model: &str) -> Vec<String> {
        self.relationships
            .get(model)
            .map(|relationships| relationships.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// All relationships defined on a model
    pub fn all_for_model(&self, model: &str) -> Option<HashMap<String, Arc<dyn Relationship>>> {
        self.relationships.get(model).map(|entry| entry.clone())
    }

    /// Total number of defined relationships across all models
    pub fn len(&self) -> usize {
        self.relationships.iter().map(|entry| entry.value().len()).sum()
    }

    /// Whether no relationships are defined
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all definitions; test support
    pub fn clear(&self) {
        self.relationships.clear();
    }
}
