//! ManyToMany relationship - composed from chained one-to-many hops
//!
//! Resolution traverses source -> through hop -> join records -> via hop
//! -> final targets. Effective key semantics always come from the near
//! relationship, the terminal hop of the through-chain, which is resolved
//! once at construction.

use std::sync::Arc;

use crate::error::{AssociationError, AssociationResult};
use crate::key::Key;
use crate::query::Query;
use crate::record::Record;
use crate::store::RecordStore;

use super::cache::AssociationCache;
use super::traits::{near_relationship, Relationship, RelationshipKind};

/// Collections on both sides, composed through an intermediate join model
#[derive(Debug)]
pub struct ManyToMany {
    name: String,
    source_model: String,
    target_model: String,
    /// Hop from the source model to the join model
    through: Arc<dyn Relationship>,
    /// Hop from the join model to the target model
    via: Arc<dyn Relationship>,
    /// Terminal hop of the through-chain; supplies effective keys
    near: Arc<dyn Relationship>,
    cache: AssociationCache,
}

impl ManyToMany {
    /// Compose a many-to-many relationship from two hops
    ///
    /// The through hop must start at `source_model`; the via hop must
    /// bridge the through hop's target (the join model) to
    /// `target_model`. The chain may itself contain further through hops.
    pub fn new(
        name: impl Into<String>,
        source_model: impl Into<String>,
        target_model: impl Into<String>,
        through: Arc<dyn Relationship>,
        via: Arc<dyn Relationship>,
    ) -> AssociationResult<Self> {
        let name = name.into();
        let source_model = source_model.into();
        let target_model = target_model.into();

        if through.source_model() != source_model {
            return Err(AssociationError::Configuration(format!(
                "relationship '{}': through hop '{}' starts at '{}', expected '{}'",
                name,
                through.name(),
                through.source_model(),
                source_model
            )));
        }
        if via.source_model() != through.target_model() {
            return Err(AssociationError::Configuration(format!(
                "relationship '{}': via hop '{}' starts at '{}', expected join model '{}'",
                name,
                via.name(),
                via.source_model(),
                through.target_model()
            )));
        }
        if via.target_model() != target_model {
            return Err(AssociationError::Configuration(format!(
                "relationship '{}': via hop '{}' targets '{}', expected '{}'",
                name,
                via.name(),
                via.target_model(),
                target_model
            )));
        }

        let near = near_relationship(&through);

        Ok(Self {
            name,
            source_model,
            target_model,
            through,
            via,
            near,
            cache: AssociationCache::new(),
        })
    }

    /// The hop from the join model to the target model
    pub fn via(&self) -> &Arc<dyn Relationship> {
        &self.via
    }

    fn assert_source(&self, source: &Record) -> AssociationResult<()> {
        if source.is_instance_of(&self.source_model) {
            Ok(())
        } else {
            Err(AssociationError::type_mismatch(
                "source",
                self.source_model.clone(),
                source.model(),
            ))
        }
    }

    fn assert_target(&self, target: &Record) -> AssociationResult<()> {
        if target.is_instance_of(&self.target_model) {
            Ok(())
        } else {
            Err(AssociationError::type_mismatch(
                "target",
                self.target_model.clone(),
                target.model(),
            ))
        }
    }
}

impl Relationship for ManyToMany {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_model(&self) -> &str {
        &self.source_model
    }

    fn target_model(&self) -> &str {
        &self.target_model
    }

    // Effective keys resolve through the near relationship regardless of
    // how deep the through-chain is.
    fn source_key(&self) -> &Key {
        self.near.source_key()
    }

    fn target_key(&self) -> &Key {
        self.near.target_key()
    }

    fn kind(&self) -> RelationshipKind {
        RelationshipKind::ManyToMany
    }

    fn through(&self) -> Option<Arc<dyn Relationship>> {
        Some(Arc::clone(&self.through))
    }

    fn get(
        &self,
        store: &dyn RecordStore,
        source: &Record,
        other_query: Option<&Query>,
    ) -> AssociationResult<Vec<Record>> {
        self.assert_source(source)?;

        if other_query.is_none() {
            if let Some(cached) = self.cache.fetch(source.instance_id()) {
                tracing::debug!(
                    "Association '{}' cache hit for instance {}",
                    self.name,
                    source.instance_id()
                );
                return Ok(cached);
            }
        }

        let key = self.near.source_key();
        if !key.valid(&key.get(source)) {
            tracing::trace!(
                "Association '{}': source key unset on instance {}, skipping traversal",
                self.name,
                source.instance_id()
            );
            return Ok(Vec::new());
        }

        let joins = self.through.get(store, source, None)?;
        let mut targets = Vec::new();
        for join in &joins {
            targets.extend(self.via.get(store, join, other_query)?);
        }
        tracing::debug!(
            "Association '{}' traversed {} join record(s) into {} target(s)",
            self.name,
            joins.len(),
            targets.len()
        );

        if other_query.is_some() {
            return Ok(targets);
        }

        self.cache.store(source.instance_id(), targets.clone());
        Ok(targets)
    }

    fn set(&self, source: &Record, targets: Vec<Record>) -> AssociationResult<Vec<Record>> {
        self.assert_source(source)?;
        for target in &targets {
            self.assert_target(target)?;
        }

        self.cache.store(source.instance_id(), targets.clone());
        Ok(targets)
    }

    fn is_loaded(&self, source: &Record) -> bool {
        self.cache.contains(source.instance_id())
    }

    fn unload(&self, source: &Record) {
        self.cache.remove(source.instance_id());
    }
}
