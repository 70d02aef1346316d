//! OneToOne relationship - singular adapter over a collection relationship
//!
//! Not an independent implementation: a thin wrapper that owns a
//! OneToMany (or a ManyToMany when composed through a join model) and
//! exposes singular get/set semantics by taking the first element of the
//! underlying collection. The wrapper holds no key or cache state of its
//! own; everything is explicit delegation through the shared
//! `Relationship` contract.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{AssociationError, AssociationResult};
use crate::key::Key;
use crate::query::Query;
use crate::record::Record;
use crate::store::RecordStore;

use super::many_to_many::ManyToMany;
use super::one_to_many::OneToMany;
use super::options::RelationshipOptions;
use super::registry::derive_target_model;
use super::traits::{valid_source, Relationship, RelationshipKind};

/// One source record maps to at most one target record
///
/// If the underlying collection resolves to more than one record, the
/// first in store order is returned and the rest are silently ignored;
/// cardinality violations are not reported here.
#[derive(Debug)]
pub struct OneToOne {
    relationship: Arc<dyn Relationship>,
}

impl OneToOne {
    /// Define a one-to-one relationship
    ///
    /// With a `through` option the delegate is a [`ManyToMany`],
    /// otherwise a [`OneToMany`]. When `target_model` is not given it is
    /// derived by camelizing the association name.
    pub fn new(
        name: impl Into<String>,
        target_model: Option<String>,
        source_model: impl Into<String>,
        mut options: RelationshipOptions,
    ) -> AssociationResult<Self> {
        let name = name.into();
        let source_model = source_model.into();
        let target_model = target_model.unwrap_or_else(|| derive_target_model(&name));

        let relationship: Arc<dyn Relationship> = match options.take_through() {
            Some((through, via)) => Arc::new(ManyToMany::new(
                name,
                source_model,
                target_model,
                through,
                via,
            )?),
            None => Arc::new(OneToMany::new(name, source_model, target_model, options)?),
        };

        Ok(Self { relationship })
    }

    /// Load (if necessary) and return the association target for `source`
    ///
    /// Returns `None` without a store access when the relationship is not
    /// yet loaded and the source's key is not valid.
    pub fn first(
        &self,
        store: &dyn RecordStore,
        source: &Record,
        other_query: Option<&Query>,
    ) -> AssociationResult<Option<Record>> {
        self.assert_source(source)?;

        if !self.relationship.is_loaded(source) && !valid_source(self.relationship.as_ref(), source)
        {
            return Ok(None);
        }

        let records = self.relationship.get(store, source, other_query)?;
        Ok(records.into_iter().next())
    }

    /// Assign the association target for `source` without persisting
    ///
    /// `None` clears the association; a subsequent `first` resolves to
    /// `None` from the cache.
    pub fn set_one(
        &self,
        source: &Record,
        target: Option<Record>,
    ) -> AssociationResult<Option<Record>> {
        if let Some(ref target) = target {
            if !target.is_instance_of(self.relationship.target_model()) {
                return Err(AssociationError::type_mismatch(
                    "target",
                    self.relationship.target_model(),
                    target.model(),
                ));
            }
        }

        let targets: Vec<Record> = target.into_iter().collect();
        let stored = self.relationship.set(source, targets)?;
        Ok(stored.into_iter().next())
    }

    /// Assign the association from a plain attribute map
    ///
    /// Builds a target-model record from the raw attributes, then assigns
    /// it like [`OneToOne::set_one`].
    pub fn set_attributes(
        &self,
        source: &Record,
        attributes: HashMap<String, Value>,
    ) -> AssociationResult<Option<Record>> {
        let target = Record::with_attributes(self.relationship.target_model(), attributes);
        self.set_one(source, Some(target))
    }

    fn assert_source(&self, source: &Record) -> AssociationResult<()> {
        if source.is_instance_of(self.relationship.source_model()) {
            Ok(())
        } else {
            Err(AssociationError::type_mismatch(
                "source",
                self.relationship.source_model(),
                source.model(),
            ))
        }
    }
}

// Explicit delegation to the wrapped collection relationship. The
// collection-shaped operations route through the singular overrides, so a
// OneToOne can stand in for its delegate anywhere a Relationship is
// expected while never yielding more than one record.
impl Relationship for OneToOne {
    fn name(&self) -> &str {
        self.relationship.name()
    }

    fn source_model(&self) -> &str {
        self.relationship.source_model()
    }

    fn target_model(&self) -> &str {
        self.relationship.target_model()
    }

    fn source_key(&self) -> &Key {
        self.relationship.source_key()
    }

    fn target_key(&self) -> &Key {
        self.relationship.target_key()
    }

    fn kind(&self) -> RelationshipKind {
        RelationshipKind::OneToOne
    }

    // Answers truthfully for both the declared kind and the delegate's
    fn is_kind(&self, kind: RelationshipKind) -> bool {
        kind == RelationshipKind::OneToOne || self.relationship.is_kind(kind)
    }

    fn through(&self) -> Option<Arc<dyn Relationship>> {
        self.relationship.through()
    }

    fn get(
        &self,
        store: &dyn RecordStore,
        source: &Record,
        other_query: Option<&Query>,
    ) -> AssociationResult<Vec<Record>> {
        Ok(self.first(store, source, other_query)?.into_iter().collect())
    }

    fn set(&self, source: &Record, targets: Vec<Record>) -> AssociationResult<Vec<Record>> {
        let target = targets.into_iter().next();
        Ok(self.set_one(source, target)?.into_iter().collect())
    }

    fn is_loaded(&self, source: &Record) -> bool {
        self.relationship.is_loaded(source)
    }

    fn unload(&self, source: &Record) {
        self.relationship.unload(source)
    }
}
