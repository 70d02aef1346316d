//! Relationship traits - shared capability contract for all relationship kinds
//!
//! Every relationship kind implements the same `Relationship` interface;
//! singular kinds participate through explicit delegation rather than a
//! broad inherited base, so their public surface stays narrow by
//! construction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AssociationResult;
use crate::key::Key;
use crate::query::Query;
use crate::record::Record;
use crate::store::RecordStore;

/// The kind of a relationship between two models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// One source record maps to at most one target record
    OneToOne,
    /// One source record maps to a collection of target records
    OneToMany,
    /// Collections on both sides, composed through a join model
    ManyToMany,
}

impl RelationshipKind {
    /// Returns true if this kind resolves to a collection
    pub fn is_collection(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }

    /// Returns true if this kind is composed through a join model
    pub fn requires_through(self) -> bool {
        matches!(self, Self::ManyToMany)
    }
}

/// Contract shared by all relationship kinds
///
/// Definitions are immutable once constructed and shared via
/// `Arc<dyn Relationship>`; loaded-state is scoped per source instance,
/// held in interior-mutable caches owned by the definition.
pub trait Relationship: Send + Sync + std::fmt::Debug {
    /// Relationship name, unique within the source model
    fn name(&self) -> &str;

    /// The model association resolution starts from
    fn source_model(&self) -> &str;

    /// The model resolved records belong to
    fn target_model(&self) -> &str;

    /// Key extracted from source instances
    fn source_key(&self) -> &Key;

    /// Key matched against target instances
    fn target_key(&self) -> &Key;

    /// The kind of this relationship
    fn kind(&self) -> RelationshipKind;

    /// Whether this relationship answers for the given kind
    ///
    /// Delegating kinds override this to answer for both their own kind
    /// and the kind of the relationship they wrap.
    fn is_kind(&self, kind: RelationshipKind) -> bool {
        self.kind() == kind
    }

    /// The intermediate hop this relationship is composed through, if any
    fn through(&self) -> Option<Arc<dyn Relationship>> {
        None
    }

    /// Resolve the association for `source`, loading on first access
    ///
    /// Fails with a type mismatch if `source` is not of the source model.
    /// A source whose key is not yet set resolves to an empty collection
    /// without touching the store. A supplied `other_query` forces a
    /// fresh targeted fetch whose result is not cached.
    fn get(
        &self,
        store: &dyn RecordStore,
        source: &Record,
        other_query: Option<&Query>,
    ) -> AssociationResult<Vec<Record>>;

    /// Replace the association state for `source` without persisting
    ///
    /// Every target must be of the target model. The instance-scoped
    /// cache is overwritten wholesale.
    fn set(&self, source: &Record, targets: Vec<Record>) -> AssociationResult<Vec<Record>>;

    /// Whether `get` or `set` already ran for this source instance
    ///
    /// Never touches the store.
    fn is_loaded(&self, source: &Record) -> bool;

    /// Drop the cached association state for this source instance
    fn unload(&self, source: &Record);
}

/// Walk the through-chain to the terminal relationship with no through hop
pub fn near_relationship(relationship: &Arc<dyn Relationship>) -> Arc<dyn Relationship> {
    let mut near = Arc::clone(relationship);
    while let Some(through) = near.through() {
        near = through;
    }
    near
}

// Near hop of a borrowed relationship, or None when the relationship is
// already terminal (its own keys are the effective ones).
fn near_of(relationship: &dyn Relationship) -> Option<Arc<dyn Relationship>> {
    let mut near = relationship.through()?;
    while let Some(through) = near.through() {
        near = through;
    }
    Some(near)
}

/// Check that `source` is of the relationship's source model and its
/// effective source key is fully set
pub fn valid_source(relationship: &dyn Relationship, source: &Record) -> bool {
    if !source.is_instance_of(relationship.source_model()) {
        return false;
    }
    match near_of(relationship) {
        Some(near) => {
            let key = near.source_key().clone();
            key.valid(&key.get(source))
        }
        None => {
            let key = relationship.source_key();
            key.valid(&key.get(source))
        }
    }
}

/// Check that `target` is of the relationship's target model and its
/// effective target key is fully set
pub fn valid_target(relationship: &dyn Relationship, target: &Record) -> bool {
    if !target.is_instance_of(relationship.target_model()) {
        return false;
    }
    match near_of(relationship) {
        Some(near) => {
            let key = near.target_key().clone();
            key.valid(&key.get(target))
        }
        None => {
            let key = relationship.target_key();
            key.valid(&key.get(target))
        }
    }
}
